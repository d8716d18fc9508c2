//! Dropbox client and request assembly
//!
//! Every endpoint call goes through the same steps: resolve the call's
//! options against the endpoint rules and the client defaults, build one
//! signed request, send it, then route the answer to the caller's sink and
//! the JSON decoder. Local errors are raised before anything is sent.

use std::io::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::auth::{Credentials, Token, parse_token_reply};
use crate::defaults::Defaults;
use crate::endpoint::{ACCESS_TOKEN_URL, Endpoint, Method, REQUEST_TOKEN_URL, Style};
use crate::error::{Error, Result};
use crate::json;
use crate::option::{IoHandle, OptionId, Options, SharedSink};
use crate::resolve::{QueryString, Resolved, resolve};
use crate::stream::{StreamBuffer, pipe};
use crate::traits::{HttpRequest, HttpResponse, RequestBody, Signer, Transport};
use crate::types::{AccountInfo, CopyRef, Delta, Link, Metadata, MetadataList, PollDelta};

/// Header carrying the metadata of a downloaded file
pub const METADATA_HEADER: &str = "x-dropbox-metadata";

/// A request ready to be sent, with the sink its body belongs to
pub struct PreparedRequest {
    pub request: HttpRequest,
    sink: Option<SharedSink>,
}

/// Dropbox Core API client
///
/// Defaults are changed through `&mut self` while calls only borrow the
/// client, so a client shared between tasks must be wrapped by the caller.
pub struct Client {
    credentials: Credentials,
    defaults: Defaults,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
}

impl Client {
    /// Create a client for the application identified by `consumer`
    pub fn new(consumer: Token, transport: Arc<dyn Transport>, signer: Arc<dyn Signer>) -> Self {
        Self {
            credentials: Credentials::new(consumer),
            defaults: Defaults::new(),
            transport,
            signer,
        }
    }

    /// Use an already obtained access token
    pub fn with_token(mut self, token: Token) -> Self {
        self.credentials.token = Some(token);
        self
    }

    pub fn token(&self) -> Option<&Token> {
        self.credentials.token.as_ref()
    }

    pub fn set_token(&mut self, token: Option<Token>) {
        self.credentials.token = token;
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Set or clear client defaults
    ///
    /// Passing [`crate::Value::Ignore`] for an option removes its default.
    /// The call is all or nothing: on error no default changes.
    pub fn set_default(&mut self, options: Options) -> Result<()> {
        self.defaults.set(options)
    }

    /// Obtain a request token and keep it as the client token
    pub async fn obtain_request_token(&mut self) -> Result<Token> {
        self.credentials.token = None;
        let token = self.exchange_token(REQUEST_TOKEN_URL).await?;
        self.credentials.token = Some(token.clone());
        Ok(token)
    }

    /// Exchange the authorized request token for an access token
    pub async fn obtain_access_token(&mut self) -> Result<Token> {
        if self.credentials.token.is_none() {
            return Err(Error::Unknown("no request token to exchange".into()));
        }
        let token = self.exchange_token(ACCESS_TOKEN_URL).await?;
        self.credentials.token = Some(token.clone());
        Ok(token)
    }

    async fn exchange_token(&self, url: &str) -> Result<Token> {
        let signed = self
            .signer
            .sign(Method::Post, url, &QueryString::new(), &self.credentials)?;
        let request = HttpRequest::new(Method::Post, url).body(RequestBody::Form(signed));

        tracing::debug!(url, "Token exchange");
        let response = self.transport.send(request).await?;
        check_status(url, &response)?;

        let reply = String::from_utf8_lossy(&response.body);
        parse_token_reply(&reply).ok_or_else(|| Error::Unknown("malformed token reply".into()))
    }

    /// Resolve `options` and build the signed request for `endpoint`
    pub fn prepare(&self, endpoint: Endpoint, options: Options) -> Result<PreparedRequest> {
        let Resolved { special, query } = resolve(options, endpoint.rules(), &self.defaults)?;

        let style = endpoint.style();
        let method = style.method();
        let url = endpoint.url(&special)?;

        tracing::debug!(
            endpoint = %endpoint,
            url = %url,
            params = query.params(),
            timeout = special.network_timeout,
            "Request resolved"
        );

        let signed = self.signer.sign(method, &url, &query, &self.credentials)?;

        let mut request = match style {
            Style::PostForm => HttpRequest::new(method, url).body(RequestBody::Form(signed)),
            Style::Get | Style::Download | Style::Upload => {
                HttpRequest::new(method, with_query(url, &signed))
            }
        }
        .timeout_secs(special.network_timeout);

        let mut sink = None;
        match style {
            Style::Upload => {
                let source = special
                    .source
                    .ok_or(Error::MissingOption(OptionId::IoSource))?;
                let mut buffer = StreamBuffer::new();
                {
                    let mut reader = source.lock().map_err(|_| poisoned("upload source"))?;
                    buffer.load(&mut *reader)?;
                }
                tracing::debug!(bytes = buffer.len(), "Upload payload loaded");
                request = request.body(RequestBody::Raw(Bytes::from(buffer.into_inner())));
            }
            Style::Download => {
                sink = Some(special.sink.ok_or(Error::MissingOption(OptionId::IoSink))?);
                request = request.capture_header(METADATA_HEADER);
            }
            Style::Get | Style::PostForm => {}
        }

        Ok(PreparedRequest { request, sink })
    }

    /// Send a prepared request and decode its answer
    pub async fn execute<T: DeserializeOwned>(&self, prepared: PreparedRequest) -> Result<T> {
        let PreparedRequest { request, sink } = prepared;
        let url = request.url.clone();

        let response = self.transport.send(request).await?;
        check_status(&url, &response)?;

        let Some(sink) = sink else {
            return json::decode(&response.body);
        };

        {
            let mut writer = sink.lock().map_err(|_| poisoned("download sink"))?;
            if !pipe(&mut response.body.as_ref(), &mut *writer) {
                return Err(Error::Unknown("download sink did not accept the data".into()));
            }
            if let Err(e) = writer.flush() {
                tracing::warn!(error = %e, "Download sink flush failed");
            }
        }

        let header = response
            .header
            .ok_or_else(|| Error::Unknown(format!("missing {METADATA_HEADER} header")))?;
        json::decode(header.as_bytes())
    }

    async fn call<T: DeserializeOwned>(&self, endpoint: Endpoint, options: Options) -> Result<T> {
        let prepared = self.prepare(endpoint, options)?;
        self.execute(prepared).await
    }

    /// Account name, email and quota
    pub async fn account_info(&self, options: Options) -> Result<AccountInfo> {
        self.call(Endpoint::AccountInfo, options).await
    }

    /// Metadata of a file or folder, with folder contents when `list` is set
    pub async fn metadata(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Metadata, options).await
    }

    /// Download a file into the [`OptionId::IoSink`] handle
    pub async fn get_file(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::GetFile, options).await
    }

    /// Upload the content of the [`OptionId::IoSource`] handle
    pub async fn put_file(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::PutFile, options).await
    }

    pub async fn revisions(&self, options: Options) -> Result<MetadataList> {
        self.call(Endpoint::Revisions, options).await
    }

    pub async fn search(&self, options: Options) -> Result<MetadataList> {
        self.call(Endpoint::Search, options).await
    }

    /// Download a thumbnail into the [`OptionId::IoSink`] handle
    pub async fn thumbnail(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Thumbnail, options).await
    }

    pub async fn copy(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Copy, options).await
    }

    pub async fn create_folder(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::CreateFolder, options).await
    }

    pub async fn delete(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Delete, options).await
    }

    /// Move or rename (`fileops/move`)
    pub async fn move_item(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Move, options).await
    }

    pub async fn delta(&self, options: Options) -> Result<Delta> {
        self.call(Endpoint::Delta, options).await
    }

    pub async fn restore(&self, options: Options) -> Result<Metadata> {
        self.call(Endpoint::Restore, options).await
    }

    /// Shareable link to a file or folder
    pub async fn share(&self, options: Options) -> Result<Link> {
        self.call(Endpoint::Share, options).await
    }

    /// Direct, temporary link to a file
    pub async fn media(&self, options: Options) -> Result<Link> {
        self.call(Endpoint::Media, options).await
    }

    pub async fn copy_ref(&self, options: Options) -> Result<CopyRef> {
        self.call(Endpoint::CopyRef, options).await
    }

    /// Wait for changes after `cursor`; never subject to a client timeout
    pub async fn longpoll_delta(&self, options: Options) -> Result<PollDelta> {
        self.call(Endpoint::LongpollDelta, options).await
    }
}

fn with_query(mut url: String, params: &str) -> String {
    if !params.is_empty() {
        url.push('?');
        url.push_str(params);
    }
    url
}

fn check_status(url: &str, response: &HttpResponse) -> Result<()> {
    if response.is_ok() {
        return Ok(());
    }

    let message = json::decode_error(&response.body);
    tracing::warn!(
        url = url.split('?').next().unwrap_or(url),
        status = response.status,
        message = message.as_deref().unwrap_or(""),
        "Request failed"
    );
    Err(Error::Server {
        status: response.status,
        message,
    })
}

fn poisoned(what: &str) -> Error {
    Error::Unknown(format!("{what} lock poisoned"))
}

/// Helper for callers that download into memory
pub fn memory_sink() -> (Arc<Mutex<Vec<u8>>>, IoHandle) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let handle = IoHandle::Sink(buffer.clone());
    (buffer, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::Value;
    use crate::traits::MockTransport;

    /// Appends a fixed marker instead of a real signature
    struct FakeSigner;

    impl Signer for FakeSigner {
        fn sign(
            &self,
            _method: Method,
            _url: &str,
            params: &QueryString,
            _credentials: &Credentials,
        ) -> Result<String> {
            let mut signed = params.params().to_string();
            if !signed.is_empty() {
                signed.push('&');
            }
            signed.push_str("oauth_signature=sig");
            Ok(signed)
        }
    }

    fn client(transport: MockTransport) -> Client {
        Client::new(
            Token::new("appkey", "appsecret"),
            Arc::new(transport),
            Arc::new(FakeSigner),
        )
        .with_token(Token::new("tok", "toksecret"))
    }

    #[tokio::test]
    async fn test_metadata_with_default_root() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.url.starts_with("https://api.dropbox.com/1/metadata/auto/?")
                    && req.url.contains("list=true")
                    && req.timeout.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"path":"/","is_dir":true}"#)));

        let mut client = client(transport);
        client
            .set_default(Options::new().with(OptionId::Root, "auto"))
            .unwrap();

        let meta = client
            .metadata(
                Options::new()
                    .with(OptionId::Path, "/")
                    .with(OptionId::List, true),
            )
            .await
            .unwrap();

        assert_eq!(meta.path.as_deref(), Some("/"));
        assert_eq!(meta.is_dir, Some(true));
        assert_eq!(meta, Metadata {
            path: Some("/".into()),
            is_dir: Some(true),
            ..Default::default()
        });
    }

    #[tokio::test]
    async fn test_local_error_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();
        let client = client(transport);

        let err = client
            .metadata(Options::new().with(OptionId::Path, "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingOption(OptionId::Root)));

        let err = client
            .search(
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::Path, "/")
                    .with(OptionId::Query, "a")
                    .with(OptionId::Query, "b"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), 3);
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse::new(
                404,
                r#"{"error": "Path '/nope' not found"}"#,
            ))
        });
        let client = client(transport);

        let err = client
            .metadata(
                Options::new()
                    .with(OptionId::Root, "dropbox")
                    .with(OptionId::Path, "/nope"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), 404);
        assert_eq!(err.output_message().as_deref(), Some("Path '/nope' not found"));
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| Err(Error::Timeout));
        let client = client(transport);

        let err = client.account_info(Options::new()).await.unwrap_err();
        assert_eq!(err.code(), 8);
    }

    #[tokio::test]
    async fn test_post_form_sends_params_in_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.url == "https://api.dropbox.com/1/fileops/delete"
                    && req.body
                        == RequestBody::Form(
                            "path=/old%20file.txt&root=auto&oauth_signature=sig".into(),
                        )
                    && req.timeout == Some(std::time::Duration::from_secs(15))
            })
            .returning(|_| Ok(HttpResponse::new(200, r#"{"path":"/old file.txt","is_deleted":true}"#)));

        let mut client = client(transport);
        client
            .set_default(
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::NetworkTimeout, 15),
            )
            .unwrap();

        let meta = client
            .delete(Options::new().with(OptionId::Path, "/old file.txt"))
            .await
            .unwrap();
        assert!(meta.is_deleted());
    }

    #[tokio::test]
    async fn test_download_pipes_body_and_decodes_header() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.capture_header == Some(METADATA_HEADER)
                    && req
                        .url
                        .starts_with("https://api-content.dropbox.com/1/files/sandbox/hello.txt?")
            })
            .returning(|_| {
                Ok(HttpResponse::new(200, "hello, world")
                    .with_header(r#"{"path":"/hello.txt","bytes":12}"#))
            });
        let client = client(transport);

        let (buffer, sink) = memory_sink();
        let meta = client
            .get_file(
                Options::new()
                    .with(OptionId::Root, "sandbox")
                    .with(OptionId::Path, "/hello.txt")
                    .with(OptionId::IoSink, sink),
            )
            .await
            .unwrap();

        assert_eq!(meta.bytes, Some(12));
        assert_eq!(buffer.lock().unwrap().as_slice(), b"hello, world");
    }

    #[tokio::test]
    async fn test_download_error_leaves_sink_untouched() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(404, r#"{"error": "File not found"}"#)));
        let client = client(transport);

        let (buffer, sink) = memory_sink();
        let err = client
            .thumbnail(
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::Path, "/a.jpg")
                    .with(OptionId::Size, "m")
                    .with(OptionId::IoSink, sink),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), 404);
        assert!(buffer.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_fails_when_sink_is_full() {
        struct FullSink;

        impl Write for FullSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse::new(200, "data").with_header(r#"{"path":"/a"}"#))
        });
        let client = client(transport);

        let err = client
            .get_file(
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::Path, "/a")
                    .with(OptionId::IoSink, IoHandle::sink(FullSink)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), 6);
    }

    #[tokio::test]
    async fn test_upload_loads_source() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.url.starts_with(
                        "https://api-content.dropbox.com/1/files_put/auto/notes.txt?overwrite=false",
                    )
                    && req.body == RequestBody::Raw(Bytes::from_static(b"some notes"))
            })
            .returning(|_| Ok(HttpResponse::new(200, r#"{"path":"/notes.txt","bytes":10}"#)));
        let client = client(transport);

        let meta = client
            .put_file(
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::Path, "/notes.txt")
                    .with(OptionId::Overwrite, false)
                    .with(OptionId::IoSource, IoHandle::source(&b"some notes"[..])),
            )
            .await
            .unwrap();
        assert_eq!(meta.bytes, Some(10));
    }

    #[tokio::test]
    async fn test_longpoll_ignores_network_timeout_default() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.timeout.is_none()
                    && req.url
                        == "https://api-notify.dropbox.com/1/longpoll_delta?cursor=AAE&timeout=60&oauth_signature=sig"
            })
            .returning(|_| Ok(HttpResponse::new(200, r#"{"changes": false}"#)));

        let mut client = client(transport);
        client
            .set_default(Options::new().with(OptionId::NetworkTimeout, 30))
            .unwrap();

        let poll = client
            .longpoll_delta(
                Options::new()
                    .with(OptionId::Cursor, "AAE")
                    .with(OptionId::Timeout, 60),
            )
            .await
            .unwrap();
        assert_eq!(poll.changes, Some(false));
        assert_eq!(poll.backoff, None);
    }

    #[tokio::test]
    async fn test_network_timeout_on_longpoll_is_sent_as_unknown() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();
        let client = client(transport);

        let err = client
            .longpoll_delta(
                Options::new()
                    .with(OptionId::Cursor, "AAE")
                    .with(OptionId::NetworkTimeout, 10),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOption(OptionId::NetworkTimeout)));
    }

    #[tokio::test]
    async fn test_request_and_access_token() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url == REQUEST_TOKEN_URL)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    "oauth_token_secret=rsecret&oauth_token=rkey",
                ))
            });
        transport
            .expect_send()
            .withf(|req| req.url == ACCESS_TOKEN_URL)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    "oauth_token_secret=asecret&oauth_token=akey&uid=1",
                ))
            });

        let mut client = Client::new(
            Token::new("appkey", "appsecret"),
            Arc::new(transport),
            Arc::new(FakeSigner),
        );

        let request = client.obtain_request_token().await.unwrap();
        assert_eq!(request, Token::new("rkey", "rsecret"));
        assert_eq!(client.token(), Some(&request));

        let access = client.obtain_access_token().await.unwrap();
        assert_eq!(access, Token::new("akey", "asecret"));
        assert_eq!(client.token(), Some(&access));
    }

    #[tokio::test]
    async fn test_malformed_token_reply() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(200, "oauth_token=only")));
        let mut client = client(transport);

        let err = client.obtain_request_token().await.unwrap_err();
        assert_eq!(err.code(), 6);
    }

    #[test]
    fn test_prepare_ignored_values() {
        let client = client(MockTransport::new());
        let prepared = client
            .prepare(
                Endpoint::Search,
                Options::new()
                    .with(OptionId::Root, "auto")
                    .with(OptionId::Path, "/")
                    .with(OptionId::Query, "report")
                    .with(OptionId::FileLimit, Value::Ignore),
            )
            .unwrap();
        assert_eq!(
            prepared.request.url,
            "https://api.dropbox.com/1/search/auto/?query=report&oauth_signature=sig"
        );
    }
}
