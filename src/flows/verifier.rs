//! Sources of human-entered verification codes.
//!
//! The session manager only depends on [`VerifierSource`]. The CLI reads one line from a stream
//! ([`LineVerifier`]); the server hands the code over from a later request ([`ChannelVerifier`]);
//! unattended callers refuse interactive authorization altogether ([`NonInteractive`]).

// std
use std::{
	io::{BufRead, BufReader, Stderr, Stdin, Write},
	time::Duration as StdDuration,
};
// crates.io
use tokio::{sync::oneshot, task};
// self
use crate::{_prelude::*, auth::CustomerId, error::TransportError, http::Deadline};

/// Boxed future returned by [`VerifierSource::verification_code`].
pub type VerifierFuture<'a> = Pin<Box<dyn Future<Output = Result<Verification>> + 'a + Send>>;

/// A verification code plus the deadline that should govern the exchange that follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
	/// Code as entered; surrounding whitespace is ignored by the caller.
	pub code: String,
	/// Replacement deadline for the `verify` call, when the code arrived with its own.
	pub deadline: Option<Deadline>,
}
impl Verification {
	/// Wraps a code that carries no deadline of its own.
	pub fn new(code: impl Into<String>) -> Self {
		Self { code: code.into(), deadline: None }
	}
}

/// Capability that shows an authorization URL to a human and returns the code they enter.
pub trait VerifierSource
where
	Self: Send + Sync,
{
	/// Presents `authorize_url` for `customer_id` and waits for the code.
	fn verification_code<'a>(
		&'a self,
		customer_id: &'a CustomerId,
		authorize_url: &'a Url,
	) -> VerifierFuture<'a>;

	/// Whether a human is available at all; when `false` the interactive branch is skipped.
	fn interactive(&self) -> bool {
		true
	}
}

/// Prompts on a writer and reads one line from a reader.
///
/// Both run on tokio's blocking pool, so a human taking their time never stalls a worker
/// thread.
#[derive(Debug)]
pub struct LineVerifier<R, W> {
	reader: Arc<Mutex<R>>,
	writer: Arc<Mutex<W>>,
}
impl<R, W> LineVerifier<R, W>
where
	R: 'static + BufRead + Send,
	W: 'static + Write + Send,
{
	/// Wraps a prompt writer and an input reader.
	pub fn new(reader: R, writer: W) -> Self {
		Self { reader: Arc::new(Mutex::new(reader)), writer: Arc::new(Mutex::new(writer)) }
	}

	fn prompt_and_read(
		reader: &Mutex<R>,
		writer: &Mutex<W>,
		authorize_url: &Url,
	) -> Result<Verification> {
		{
			let mut writer = writer.lock();

			write!(
				writer,
				"Visit this URL to get a validation code:\n{authorize_url}\n\nEnter validation code: "
			)
			.and_then(|()| writer.flush())
			.map_err(TransportError::Io)?;
		}

		let mut line = String::new();

		reader.lock().read_line(&mut line).map_err(TransportError::Io)?;

		Ok(Verification::new(line))
	}
}
impl LineVerifier<BufReader<Stdin>, Stderr> {
	/// Prompts on stderr and reads from stdin.
	pub fn stdio() -> Self {
		Self::new(BufReader::new(std::io::stdin()), std::io::stderr())
	}
}
impl<R, W> VerifierSource for LineVerifier<R, W>
where
	R: 'static + BufRead + Send,
	W: 'static + Write + Send,
{
	fn verification_code<'a>(
		&'a self,
		_customer_id: &'a CustomerId,
		authorize_url: &'a Url,
	) -> VerifierFuture<'a> {
		let reader = self.reader.clone();
		let writer = self.writer.clone();
		let authorize_url = authorize_url.clone();

		Box::pin(async move {
			// Stdin reads cannot be cancelled; an abandoned read finishes on the blocking pool.
			task::spawn_blocking(move || Self::prompt_and_read(&reader, &writer, &authorize_url))
				.await
				.map_err(|e| {
					tracing::warn!(error = %e, "Verification prompt did not complete.");

					Error::UserAbort
				})?
		})
	}
}

/// Refuses interactive authorization.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonInteractive;
impl VerifierSource for NonInteractive {
	fn verification_code<'a>(
		&'a self,
		customer_id: &'a CustomerId,
		_authorize_url: &'a Url,
	) -> VerifierFuture<'a> {
		Box::pin(async move {
			Err(Error::auth_failed(format!(
				"customer `{customer_id}` needs interactive authorization"
			)))
		})
	}

	fn interactive(&self) -> bool {
		false
	}
}

/// Publishes the authorization URL on one channel and waits for the code on another.
///
/// Dropping the code sender (for example because a newer login replaced this one) or exceeding
/// the wait limit ends the flow with [`Error::UserAbort`].
#[derive(Debug)]
pub struct ChannelVerifier {
	url_tx: Mutex<Option<oneshot::Sender<Url>>>,
	code_rx: Mutex<Option<oneshot::Receiver<Verification>>>,
	wait: StdDuration,
}
impl ChannelVerifier {
	/// Creates a verifier and the two channel halves its counterpart holds.
	pub fn channel(
		wait: StdDuration,
	) -> (Self, oneshot::Receiver<Url>, oneshot::Sender<Verification>) {
		let (url_tx, url_rx) = oneshot::channel();
		let (code_tx, code_rx) = oneshot::channel();
		let verifier = Self {
			url_tx: Mutex::new(Some(url_tx)),
			code_rx: Mutex::new(Some(code_rx)),
			wait,
		};

		(verifier, url_rx, code_tx)
	}
}
impl VerifierSource for ChannelVerifier {
	fn verification_code<'a>(
		&'a self,
		_customer_id: &'a CustomerId,
		authorize_url: &'a Url,
	) -> VerifierFuture<'a> {
		let url_tx = self.url_tx.lock().take();
		let code_rx = self.code_rx.lock().take();
		let wait = self.wait;

		Box::pin(async move {
			let (Some(url_tx), Some(code_rx)) = (url_tx, code_rx) else {
				return Err(Error::UserAbort);
			};

			if url_tx.send(authorize_url.clone()).is_err() {
				return Err(Error::UserAbort);
			}

			match tokio::time::timeout(wait, code_rx).await {
				Ok(Ok(verification)) => Ok(verification),
				Ok(Err(_)) | Err(_) => Err(Error::UserAbort),
			}
		})
	}
}
