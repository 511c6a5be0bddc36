//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use roomrelay_transport::{
        Accepted, Connection, OriginPolicy, Transport, TransportError,
        WebSocketConnection, WebSocketTransport,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Accepts one peer and runs its upgrade.
    async fn accept_ws(
        transport: &mut WebSocketTransport,
    ) -> Result<WebSocketConnection, TransportError> {
        match transport.accept().await?.upgrade().await? {
            Accepted::WebSocket(conn) => Ok(conn),
            Accepted::Http { peer, .. } => {
                panic!("expected a WebSocket upgrade from {peer}")
            }
        }
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // Server sends, client receives.
        server_conn
            .send(br#"{"event":"room:closed"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"room:closed"}"#);

        // Client sends, server receives.
        client_ws
            .send(Message::Text("hello from client".into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // A writer task must be able to push frames while another task is
        // parked in recv().
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await.expect("should accept")
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        let reader = Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), server_conn.send(b"push"))
            .await
            .expect("send must not wait for recv")
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"push");

        client_ws.send(Message::Text("reply".into())).await.unwrap();
        let got = pending.await.unwrap().unwrap().unwrap();
        assert_eq!(got, b"reply");
    }

    #[tokio::test]
    async fn test_websocket_rejects_disallowed_origin() {
        let mut transport = WebSocketTransport::bind_with(
            "127.0.0.1:0",
            OriginPolicy::parse("https://game.example"),
        )
        .await
        .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });

        let mut request =
            format!("ws://{addr}").into_client_request().unwrap();
        request
            .headers_mut()
            .insert("Origin", "https://evil.example".parse().unwrap());
        let client = tokio_tungstenite::connect_async(request).await;
        assert!(client.is_err(), "upgrade should be refused");

        let accepted = server_handle.await.unwrap();
        assert!(matches!(accepted, Err(TransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_websocket_accepts_allowed_origin() {
        let mut transport = WebSocketTransport::bind_with(
            "127.0.0.1:0",
            OriginPolicy::parse("https://game.example"),
        )
        .await
        .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle =
            tokio::spawn(async move { accept_ws(&mut transport).await });

        let mut request =
            format!("ws://{addr}").into_client_request().unwrap();
        request
            .headers_mut()
            .insert("Origin", "https://game.example".parse().unwrap());
        let (_ws, _) = tokio_tungstenite::connect_async(request)
            .await
            .expect("allowed origin should connect");

        assert!(server_handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_websocket_accept_does_not_wait_for_upgrade() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        // Connects but never sends the upgrade request.
        let _silent = TcpStream::connect(&addr).await.unwrap();
        let stalled = transport.accept().await.expect("should accept TCP");
        let stalled = tokio::spawn(stalled.upgrade());

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await.expect("should accept")
        });
        let _client_ws = tokio::time::timeout(
            Duration::from_secs(1),
            connect_client(&addr),
        )
        .await
        .expect("second client must not wait behind the silent one");
        assert!(server_handle.await.unwrap().id().into_inner() > 0);
        assert!(!stalled.is_finished());
        stalled.abort();
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_is_sent_as_binary() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle = tokio::spawn(async move {
            accept_ws(&mut transport).await.expect("should accept")
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        server_conn.send(&[0xff, 0x00, 0xfe]).await.unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00, 0xfe]);
    }

    #[tokio::test]
    async fn test_websocket_http_path_is_handed_back_unread() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind")
            .with_http_paths(["/health"]);
        let addr = transport.local_addr().unwrap().to_string();

        let server_handle = tokio::spawn(async move {
            transport.accept().await.unwrap().upgrade().await.unwrap()
        });

        let request = b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n";
        let mut client = TcpStream::connect(&addr).await.unwrap();
        client.write_all(request).await.unwrap();

        let Accepted::Http { mut stream, .. } = server_handle.await.unwrap()
        else {
            panic!("expected the HTTP path to be handed back");
        };
        let mut head = vec![0u8; request.len()];
        stream.read_exact(&mut head).await.unwrap();
        assert_eq!(head, request);
    }
}
