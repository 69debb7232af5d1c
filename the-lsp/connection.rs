use std::{
  collections::HashMap,
  path::Path,
  sync::mpsc::{
    Receiver,
    Sender,
    TryRecvError,
  },
};

use serde_json::{
  Value,
  json,
};
use the_core::uri::Uri;
use thiserror::Error;
use tracing::{
  debug,
  trace,
  warn,
};

use crate::{
  LspCommand,
  LspEvent,
  capabilities::ServerCapabilitiesSnapshot,
  jsonrpc::{
    Message,
    Request,
    Response,
  },
  navigation::{
    LspPosition,
    navigation_params,
    parse_locations_response,
  },
};

/// Port of the local navigation endpoint that proxies language servers.
pub const NAVIGATION_PORT: u16 = 3000;

const METHOD_NOT_FOUND: i64 = -32601;

/// Addresses of one document's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
  language:     String,
  server_uri:   String,
  endpoint:     String,
  root_uri:     String,
  document_uri: String,
}

impl ConnectionConfig {
  /// Connection addresses for the document at `path`, rooted at `cwd`.
  pub fn for_document(language: &str, cwd: &Path, path: &Path) -> Self {
    Self {
      language:     language.to_string(),
      server_uri:   format!("ws://localhost/{language}"),
      endpoint:     format!("ws://localhost:{NAVIGATION_PORT}/{language}"),
      root_uri:     Uri::from(cwd).to_document_uri(),
      document_uri: Uri::from(path).to_document_uri(),
    }
  }

  pub fn language(&self) -> &str {
    &self.language
  }

  pub fn server_uri(&self) -> &str {
    &self.server_uri
  }

  /// Transport endpoint the host should connect to.
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  pub fn root_uri(&self) -> &str {
    &self.root_uri
  }

  pub fn document_uri(&self) -> &str {
    &self.document_uri
  }
}

/// One document's link to a language server.
pub trait LspConnection {
  fn config(&self) -> &ConnectionConfig;

  /// `None` until the server has answered `initialize`.
  fn capabilities(&self) -> Option<&ServerCapabilitiesSnapshot>;

  /// Sends `command` at `position` and returns the request id. The result
  /// arrives later as [`LspEvent::GoTo`].
  fn request(&mut self, command: LspCommand, position: LspPosition) -> Result<u64, ConnectionError>;

  /// Next event, if one is ready. Never blocks.
  fn poll_event(&mut self) -> Option<LspEvent>;

  fn close(&mut self);

  fn is_closed(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum ConnectionError {
  #[error("language server has not finished initializing")]
  NotInitialized,
  #[error("connection is closed")]
  Closed,
  #[error("navigation endpoint {endpoint} is unavailable: {reason}")]
  Unavailable { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
  Initialize,
  Navigation(LspCommand),
  Shutdown,
}

/// A connection exchanging JSON-RPC messages over a pair of channels. The
/// host owns the other ends and moves them over its transport.
pub struct ChannelConnection {
  config:        ConnectionConfig,
  outgoing:      Option<Sender<Message>>,
  incoming:      Receiver<Message>,
  document_text: Box<dyn Fn() -> String>,
  capabilities:  Option<ServerCapabilitiesSnapshot>,
  pending:       HashMap<u64, Pending>,
  next_id:       u64,
}

impl ChannelConnection {
  /// Starts the handshake by sending `initialize`. `document_text` is read
  /// once the server is ready for `textDocument/didOpen`.
  pub fn open(
    config: ConnectionConfig,
    outgoing: Sender<Message>,
    incoming: Receiver<Message>,
    document_text: impl Fn() -> String + 'static,
  ) -> Result<Self, ConnectionError> {
    let mut connection = Self {
      config,
      outgoing: Some(outgoing),
      incoming,
      document_text: Box::new(document_text),
      capabilities: None,
      pending: HashMap::new(),
      next_id: 0,
    };

    let params = json!({
      "processId": std::process::id(),
      "rootUri": connection.config.root_uri,
      "capabilities": {
        "textDocument": {
          "definition": { "linkSupport": true },
          "typeDefinition": { "linkSupport": true },
          "references": {}
        }
      }
    });
    connection.send_request(Pending::Initialize, "initialize", Some(params))?;
    debug!(
      language = %connection.config.language,
      endpoint = %connection.config.endpoint,
      "lsp connection opened"
    );
    Ok(connection)
  }

  fn send(&self, message: Message) -> Result<(), ConnectionError> {
    let Some(tx) = &self.outgoing else {
      return Err(ConnectionError::Closed);
    };
    trace!(method = message.method().unwrap_or("response"), "lsp send");
    tx.send(message).map_err(|_| ConnectionError::Closed)
  }

  fn send_request(
    &mut self,
    pending: Pending,
    method: &str,
    params: Option<Value>,
  ) -> Result<u64, ConnectionError> {
    self.next_id += 1;
    let id = self.next_id;
    self.send(Message::request(id, method, params))?;
    self.pending.insert(id, pending);
    Ok(id)
  }

  fn handle_response(&mut self, response: Response) -> Option<LspEvent> {
    let Some(pending) = response
      .id
      .as_number()
      .and_then(|id| self.pending.remove(&id))
    else {
      trace!(id = ?response.id, "response to unknown request");
      return None;
    };

    if let Some(error) = response.error {
      warn!(
        request = ?pending,
        code = error.code,
        message = %error.message,
        "language server returned an error"
      );
      return None;
    }

    match pending {
      Pending::Initialize => self.finish_initialize(response.result.as_ref()),
      Pending::Navigation(command) => {
        match parse_locations_response(response.result.as_ref()) {
          Ok(locations) if locations.is_empty() => {
            debug!(method = command.method(), "no locations returned");
            None
          },
          Ok(locations) => Some(LspEvent::GoTo { command, locations }),
          Err(err) => {
            warn!(method = command.method(), error = %err, "undecodable navigation result");
            None
          },
        }
      },
      Pending::Shutdown => None,
    }
  }

  fn finish_initialize(&mut self, result: Option<&Value>) -> Option<LspEvent> {
    let capabilities = ServerCapabilitiesSnapshot::from_initialize_result(result);
    self.capabilities = Some(capabilities.clone());

    let did_open = json!({
      "textDocument": {
        "uri": self.config.document_uri,
        "languageId": self.config.language,
        "version": 1,
        "text": (self.document_text)(),
      }
    });
    let sent = self
      .send(Message::notification("initialized", Some(json!({}))))
      .and_then(|()| {
        self.send(Message::notification(
          "textDocument/didOpen",
          Some(did_open),
        ))
      });
    if let Err(err) = sent {
      warn!(document = %self.config.document_uri, error = %err, "failed to open document");
    }

    Some(LspEvent::Initialized { capabilities })
  }

  /// Answers server-to-client requests so the server does not stall.
  fn reply(&self, request: Request) {
    let reply = match request.method.as_str() {
      "workspace/configuration" => {
        let items = request
          .params
          .as_ref()
          .and_then(|params| params.get("items"))
          .and_then(Value::as_array)
          .map_or(0, Vec::len);
        Message::response(request.id, Value::Array(vec![Value::Null; items]))
      },
      "window/workDoneProgress/create" | "client/registerCapability" | "client/unregisterCapability" => {
        Message::response(request.id, Value::Null)
      },
      method => {
        trace!(method, "unsupported server request");
        Message::error_response(request.id, METHOD_NOT_FOUND, "method not found")
      },
    };
    if let Err(err) = self.send(reply) {
      trace!(error = %err, "reply to server request not sent");
    }
  }
}

impl LspConnection for ChannelConnection {
  fn config(&self) -> &ConnectionConfig {
    &self.config
  }

  fn capabilities(&self) -> Option<&ServerCapabilitiesSnapshot> {
    self.capabilities.as_ref()
  }

  fn request(&mut self, command: LspCommand, position: LspPosition) -> Result<u64, ConnectionError> {
    if self.outgoing.is_none() {
      return Err(ConnectionError::Closed);
    }
    if self.capabilities.is_none() {
      return Err(ConnectionError::NotInitialized);
    }
    let params = navigation_params(command, &self.config.document_uri, position);
    self.send_request(Pending::Navigation(command), command.method(), Some(params))
  }

  fn poll_event(&mut self) -> Option<LspEvent> {
    if self.outgoing.is_none() {
      return None;
    }

    loop {
      let message = match self.incoming.try_recv() {
        Ok(message) => message,
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => {
          debug!(document = %self.config.document_uri, "lsp transport disconnected");
          self.outgoing = None;
          self.pending.clear();
          return Some(LspEvent::Closed);
        },
      };

      match message {
        Message::Response(response) => {
          if let Some(event) = self.handle_response(response) {
            return Some(event);
          }
        },
        Message::Request(request) => self.reply(request),
        Message::Notification(notification) => {
          trace!(method = %notification.method, "ignored server notification");
        },
      }
    }
  }

  fn close(&mut self) {
    if self.outgoing.is_none() {
      return;
    }
    if self.capabilities.is_some() {
      let sent = self
        .send_request(Pending::Shutdown, "shutdown", None)
        .and_then(|_| self.send(Message::notification("exit", None)));
      if let Err(err) = sent {
        trace!(error = %err, "shutdown not sent");
      }
    }
    self.outgoing = None;
    self.pending.clear();
    debug!(document = %self.config.document_uri, "lsp connection closed");
  }

  fn is_closed(&self) -> bool {
    self.outgoing.is_none()
  }
}

impl Drop for ChannelConnection {
  fn drop(&mut self) {
    self.close();
  }
}
