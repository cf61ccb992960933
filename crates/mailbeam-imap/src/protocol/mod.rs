//! Connection engine: greeting, capability negotiation, authentication
//! and the command/response lifecycle.
//!
//! The engine exclusively owns the transport. Exactly one command is in
//! flight at a time (`&mut self` serializes submissions), and all
//! untagged responses observed between a command's tag emission and its
//! terminating tagged status are attributed to that command.

mod state;

pub use state::ConnectionState;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::aggregate;
use crate::auth::Mechanism;
use crate::command::{Command, CommandEncoder, SearchKey, TagGenerator};
use crate::connection::{self, ByteStream, Config, ImapStream};
use crate::parser::{read_response, DataResponse, Response, StatusKind, StatusResponse};
use crate::types::{Capability, MailboxListing, MailboxView, ResponseCode};
use crate::{Error, Result};

/// The completed exchange of a single command.
#[derive(Debug, Clone)]
pub struct CommandReply {
    /// Untagged data responses attributed to the command.
    pub data: Vec<DataResponse>,
    /// Untagged OK/NO/BAD informational statuses.
    pub info: Vec<StatusResponse>,
    /// The terminating tagged status.
    pub status: StatusResponse,
}

impl CommandReply {
    /// Maps a NO or BAD terminating status to its error.
    ///
    /// # Errors
    ///
    /// [`Error::No`] or [`Error::Bad`] carrying the server text.
    pub fn check(self) -> Result<Self> {
        match self.status.kind {
            StatusKind::Ok | StatusKind::PreAuth => Ok(self),
            StatusKind::No => Err(Error::No(self.status.text.text)),
            StatusKind::Bad => Err(Error::Bad(self.status.text.text)),
            StatusKind::Bye => Err(Error::ServerShuttingDown(self.status.text.text)),
        }
    }
}

/// An IMAP client connection.
///
/// Generic over the transport so tests can drive it with scripted
/// streams; production code uses [`Engine::connect`] which yields an
/// `Engine<ImapStream>`.
pub struct Engine<S> {
    stream: ByteStream<S>,
    tags: TagGenerator,
    capabilities: Vec<Capability>,
    state: ConnectionState,
    config: Config,
}

impl Engine<ImapStream> {
    /// Connects to the configured endpoint and consumes the greeting.
    ///
    /// After a successful connect the engine is in `NotAuthenticated`
    /// (or `Authenticated` for a PREAUTH greeting) with a verified
    /// capability table.
    ///
    /// # Errors
    ///
    /// Transport errors, [`Error::ServerRejected`] on a BYE greeting,
    /// [`Error::InvalidGreeting`] on anything else unexpected, and
    /// [`Error::UnsupportedProtocol`] when IMAP4rev1 is missing.
    pub async fn connect(config: Config) -> Result<Self> {
        let stream = connection::connect(&config).await?;
        Self::from_stream(stream, config).await
    }
}

impl<S> Engine<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Builds an engine over an established transport stream and
    /// performs the greeting and capability handshake.
    ///
    /// # Errors
    ///
    /// See [`Engine::connect`].
    pub async fn from_stream(stream: S, config: Config) -> Result<Self> {
        let mut engine = Self {
            stream: ByteStream::new(stream),
            tags: TagGenerator::default(),
            capabilities: Vec::new(),
            state: ConnectionState::Disconnected,
            config,
        };

        engine.read_greeting().await?;

        // Re-run CAPABILITY only when the greeting did not carry one.
        if engine.capabilities.is_empty() {
            engine.capability().await?;
        }
        if !engine.capabilities.contains(&Capability::Imap4Rev1) {
            return Err(Error::UnsupportedProtocol);
        }

        Ok(engine)
    }

    /// Returns the current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the current capability table.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns true if the server advertises the given capability.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Reads and dispatches the one-response greeting.
    async fn read_greeting(&mut self) -> Result<()> {
        let response = read_response(&mut self.stream).await?;
        let status = match response {
            Response::Status(status) if status.tag.is_none() => status,
            other => {
                return Err(Error::InvalidGreeting(format!(
                    "unexpected greeting {other:?}"
                )));
            }
        };

        match status.kind {
            StatusKind::Ok => self.state = ConnectionState::NotAuthenticated,
            StatusKind::PreAuth => self.state = ConnectionState::Authenticated,
            StatusKind::Bye => return Err(Error::ServerRejected(status.text.text)),
            StatusKind::No | StatusKind::Bad => {
                return Err(Error::InvalidGreeting(status.text.text));
            }
        }

        if let Some(ResponseCode::Capability(caps)) = status.text.code {
            self.replace_capabilities(caps);
        }
        tracing::debug!(state = ?self.state, "greeting consumed");
        Ok(())
    }

    /// Sends one command and collects its responses until the
    /// terminating event.
    ///
    /// The reply carries the terminating status as data; use
    /// [`CommandReply::check`] to map NO/BAD to errors.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionDown`] when the engine is no longer usable,
    /// [`Error::ServerShuttingDown`] on BYE, transport and grammar
    /// errors (which poison the connection), and the literal-handshake
    /// violations described in [`Error`].
    pub async fn send(&mut self, cmd: &Command) -> Result<CommandReply> {
        if !self.state.is_usable() {
            return Err(Error::ConnectionDown);
        }

        let tag = self.tags.next();
        tracing::debug!(command = cmd.name(), %tag, "sending command");

        match self.run_command(&tag, cmd).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                if err.is_connection_dead() {
                    self.state = ConnectionState::Logout;
                }
                Err(err)
            }
        }
    }

    /// Drives one command through encoding, continuations and response
    /// collection.
    async fn run_command(&mut self, tag: &str, cmd: &Command) -> Result<CommandReply> {
        let mut encoder = CommandEncoder::new(tag, cmd);
        let Some((first, mut awaiting_literal)) = encoder.next_chunk() else {
            return Err(Error::Protocol("command produced no output".to_string()));
        };
        self.stream.write_all(&first).await?;
        self.stream.flush().await?;

        let mut data = Vec::new();
        let mut info = Vec::new();
        // Per-command errors (bad mailbox name, bad code payload) are
        // deferred so the stream stays aligned on the tagged status.
        let mut deferred: Option<Error> = None;

        loop {
            let response = match read_response(&mut self.stream).await {
                Ok(response) => response,
                Err(Error::UnknownResponse(token)) => {
                    tracing::warn!(%token, "skipping unknown response");
                    continue;
                }
                Err(err @ (Error::MalformedMailboxName(_) | Error::MalformedResponseCode(_))) => {
                    tracing::warn!(error = %err, "malformed response payload");
                    if deferred.is_none() {
                        deferred = Some(err);
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            match response {
                Response::Continuation { text } => {
                    if awaiting_literal {
                        let Some((chunk, more)) = encoder.next_chunk() else {
                            return Err(Error::Protocol(
                                "continuation after final command chunk".to_string(),
                            ));
                        };
                        self.stream.write_all(&chunk).await?;
                        self.stream.flush().await?;
                        awaiting_literal = more;
                    } else if let Some(line) = cmd.on_continuation(&text)? {
                        self.stream.write_all(&line).await?;
                        self.stream.flush().await?;
                    } else {
                        return Err(Error::Protocol(
                            "unexpected continuation request".to_string(),
                        ));
                    }
                }

                Response::Status(status) => {
                    if status.kind == StatusKind::Bye {
                        return Err(Error::ServerShuttingDown(status.text.text));
                    }

                    if awaiting_literal {
                        // While the literal announcement is outstanding,
                        // NO/BAD terminate the command without the payload
                        // ever being sent; OK is a protocol violation.
                        match status.kind {
                            StatusKind::Ok => return Err(Error::UnexpectedOkDuringLiteral),
                            StatusKind::No | StatusKind::Bad => {
                                return Ok(CommandReply { data, info, status });
                            }
                            StatusKind::Bye | StatusKind::PreAuth => info.push(status),
                        }
                    } else if status.tag.as_deref() == Some(tag) {
                        if let Some(err) = deferred {
                            return Err(err);
                        }
                        return Ok(CommandReply { data, info, status });
                    } else {
                        info.push(status);
                    }
                }

                Response::Data(payload) => data.push(payload),
            }
        }
    }

    /// Issues CAPABILITY and atomically replaces the capability table.
    pub async fn capability(&mut self) -> Result<Vec<Capability>> {
        let reply = self.send(&Command::Capability).await?.check()?;
        for data in &reply.data {
            if let DataResponse::Capability(caps) = data {
                self.replace_capabilities(caps.clone());
            }
        }
        Ok(self.capabilities.clone())
    }

    /// Authenticates with the configured credentials via AUTHENTICATE.
    ///
    /// A no-op when the greeting was PREAUTH. The mechanism is the
    /// configured override (which must be advertised) or the first
    /// advertised entry of the preference list.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedAuthMechanism`],
    /// [`Error::NoSupportedAuthMechanism`], or the command failure.
    pub async fn authenticate(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Authenticated | ConnectionState::Selected => return Ok(()),
            ConnectionState::NotAuthenticated => {}
            ConnectionState::Disconnected | ConnectionState::Logout => {
                return Err(Error::ConnectionDown);
            }
        }

        let mechanism = self.select_mechanism()?;
        tracing::debug!(%mechanism, "authenticating");

        let cmd = Command::Authenticate {
            mechanism,
            username: self.config.login.clone(),
            password: self.config.password.clone(),
        };
        let reply = self.send(&cmd).await?.check()?;

        self.state = ConnectionState::Authenticated;
        self.absorb_capabilities(&reply);
        Ok(())
    }

    /// Authenticates with the plaintext LOGIN command.
    ///
    /// # Errors
    ///
    /// The command failure, or [`Error::ConnectionDown`].
    pub async fn login(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Authenticated | ConnectionState::Selected => return Ok(()),
            ConnectionState::NotAuthenticated => {}
            ConnectionState::Disconnected | ConnectionState::Logout => {
                return Err(Error::ConnectionDown);
            }
        }

        let cmd = Command::Login {
            username: self.config.login.clone(),
            password: self.config.password.clone(),
        };
        let reply = self.send(&cmd).await?.check()?;

        self.state = ConnectionState::Authenticated;
        self.absorb_capabilities(&reply);
        Ok(())
    }

    /// Picks the authentication mechanism per configuration and
    /// advertised capabilities.
    fn select_mechanism(&self) -> Result<Mechanism> {
        let advertised: Vec<&str> = self
            .capabilities
            .iter()
            .filter_map(Capability::auth_mechanism)
            .collect();

        if let Some(fixed) = self.config.auth_mechanism {
            if advertised
                .iter()
                .any(|name| name.eq_ignore_ascii_case(fixed.name()))
            {
                return Ok(fixed);
            }
            return Err(Error::UnsupportedAuthMechanism(fixed.name().to_string()));
        }

        for preferred in Mechanism::PREFERENCE {
            if advertised
                .iter()
                .any(|name| name.eq_ignore_ascii_case(preferred.name()))
            {
                return Ok(preferred);
            }
        }
        Err(Error::NoSupportedAuthMechanism)
    }

    /// Lists mailboxes matching `pattern` under `reference`.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<MailboxListing>> {
        let reply = self
            .send(&Command::List {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?
            .check()?;
        Ok(aggregate::listings(&reply))
    }

    /// Lists subscribed mailboxes matching `pattern` under `reference`.
    pub async fn lsub(&mut self, reference: &str, pattern: &str) -> Result<Vec<MailboxListing>> {
        let reply = self
            .send(&Command::LSub {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?
            .check()?;
        Ok(aggregate::subscribed_listings(&reply))
    }

    /// Creates a mailbox.
    pub async fn create(&mut self, mailbox: &str) -> Result<()> {
        self.send(&Command::Create {
            mailbox: mailbox.to_string(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Deletes a mailbox.
    pub async fn delete(&mut self, mailbox: &str) -> Result<()> {
        self.send(&Command::Delete {
            mailbox: mailbox.to_string(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Renames a mailbox.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.send(&Command::Rename {
            from: from.to_string(),
            to: to.to_string(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Adds a mailbox to the subscription list.
    pub async fn subscribe(&mut self, mailbox: &str) -> Result<()> {
        self.send(&Command::Subscribe {
            mailbox: mailbox.to_string(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Removes a mailbox from the subscription list.
    pub async fn unsubscribe(&mut self, mailbox: &str) -> Result<()> {
        self.send(&Command::Unsubscribe {
            mailbox: mailbox.to_string(),
        })
        .await?
        .check()?;
        Ok(())
    }

    /// Opens a mailbox read-write.
    ///
    /// A failed SELECT leaves the connection deselected.
    pub async fn select(&mut self, mailbox: &str) -> Result<MailboxView> {
        self.open_mailbox(
            Command::Select {
                mailbox: mailbox.to_string(),
            },
            false,
        )
        .await
    }

    /// Opens a mailbox read-only.
    pub async fn examine(&mut self, mailbox: &str) -> Result<MailboxView> {
        self.open_mailbox(
            Command::Examine {
                mailbox: mailbox.to_string(),
            },
            true,
        )
        .await
    }

    async fn open_mailbox(&mut self, cmd: Command, read_only: bool) -> Result<MailboxView> {
        match self.send(&cmd).await.and_then(CommandReply::check) {
            Ok(reply) => {
                self.state = ConnectionState::Selected;
                Ok(aggregate::mailbox_view(&reply, read_only))
            }
            Err(err) => {
                // A failed SELECT/EXAMINE deselects any open mailbox.
                if self.state == ConnectionState::Selected && !err.is_connection_dead() {
                    self.state = ConnectionState::Authenticated;
                }
                Err(err)
            }
        }
    }

    /// Closes the selected mailbox.
    pub async fn close(&mut self) -> Result<()> {
        self.send(&Command::Close).await?.check()?;
        self.state = ConnectionState::Authenticated;
        Ok(())
    }

    /// Searches the selected mailbox; returns message sequence numbers.
    pub async fn search(&mut self, charset: Option<&str>, key: SearchKey) -> Result<Vec<u32>> {
        let reply = self
            .send(&Command::Search {
                charset: charset.map(str::to_string),
                key,
            })
            .await?
            .check()?;
        Ok(aggregate::search_results(&reply))
    }

    /// Sends a NOOP keep-alive.
    pub async fn noop(&mut self) -> Result<()> {
        self.send(&Command::Noop).await?.check()?;
        Ok(())
    }

    /// Logs out. The expected untagged BYE is consumed, not treated as
    /// an error; afterwards the engine refuses further commands.
    pub async fn logout(&mut self) -> Result<()> {
        if !self.state.is_usable() {
            return Ok(());
        }

        let tag = self.tags.next();
        let mut encoder = CommandEncoder::new(&tag, &Command::Logout);
        let Some((chunk, _)) = encoder.next_chunk() else {
            return Err(Error::Protocol("command produced no output".to_string()));
        };
        self.stream.write_all(&chunk).await?;
        self.stream.flush().await?;

        let mut saw_bye = false;
        loop {
            match read_response(&mut self.stream).await {
                Ok(Response::Status(status)) => {
                    if status.kind == StatusKind::Bye {
                        saw_bye = true;
                    } else if status.tag.as_deref() == Some(tag.as_str()) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(Error::UnknownResponse(_)) => {}
                Err(Error::Io(_)) if saw_bye => break,
                Err(err) => {
                    self.state = ConnectionState::Logout;
                    return Err(err);
                }
            }
        }

        self.state = ConnectionState::Logout;
        Ok(())
    }

    /// Atomically replaces the capability table.
    fn replace_capabilities(&mut self, caps: Vec<Capability>) {
        tracing::debug!(count = caps.len(), "capability table replaced");
        self.capabilities = caps;
    }

    /// Absorbs a post-command capability refresh, from untagged data or
    /// from a CAPABILITY code on the tagged status.
    fn absorb_capabilities(&mut self, reply: &CommandReply) {
        for data in &reply.data {
            if let DataResponse::Capability(caps) = data {
                self.replace_capabilities(caps.clone());
            }
        }
        if let Some(ResponseCode::Capability(caps)) = &reply.status.text.code {
            self.replace_capabilities(caps.clone());
        }
    }
}

impl<S> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .field("tags_issued", &self.tags.issued())
            .finish_non_exhaustive()
    }
}
