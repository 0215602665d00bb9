//! Two-request login: the first request starts a flow and returns the authorization URL, a later
//! request delivers the verification code to that same flow.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{sync::oneshot, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	auth::CustomerId,
	client::AuthorizedClient,
	flows::{ChannelVerifier, SessionManager, Verification},
	http::Deadline,
};

/// Body returned by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoginStatus {
	/// A human must visit `verify_url` and post the code it shows.
	Verify {
		/// Authorization page for the pending request token.
		#[serde(rename = "verifyUrl")]
		verify_url: String,
	},
	/// The customer holds a working client.
	Success,
}

#[derive(Debug)]
struct PendingLogin {
	code_tx: oneshot::Sender<Verification>,
	task: JoinHandle<Result<AuthorizedClient>>,
}

/// Tracks logins waiting for their verification code, one per customer.
///
/// A newer login for the same customer replaces the older one; the replaced flow sees its code
/// channel close and ends with [`Error::UserAbort`], so only the newest request token accepts a
/// code.
#[derive(Clone, Debug, Default)]
pub struct LoginCoordinator(Arc<Mutex<HashMap<CustomerId, PendingLogin>>>);
impl LoginCoordinator {
	/// Renews the cached token or starts interactive authorization.
	///
	/// Returns [`LoginStatus::Success`] right away when a client is already memoized, or when
	/// renewal alone produced one, which is then memoized; otherwise returns the URL the human
	/// has to visit within `verify_wait`.
	pub async fn begin(
		&self,
		manager: &SessionManager,
		customer_id: &str,
		deadline: Deadline,
		verify_wait: StdDuration,
	) -> Result<LoginStatus> {
		let (customer_id, _) = manager.resolve(customer_id)?;
		let guard = manager.guard(&customer_id);
		let _locked = guard.lock().await;

		if manager.registry().get(&customer_id).is_some() {
			return Ok(LoginStatus::Success);
		}

		let (verifier, url_rx, code_tx) = ChannelVerifier::channel(verify_wait);
		let task = {
			let manager = manager.clone();
			let customer_id = customer_id.clone();

			tokio::spawn(async move {
				manager.obtain_client(&customer_id, &verifier, deadline).await
			})
		};

		match url_rx.await {
			Ok(verify_url) => {
				let pending = PendingLogin { code_tx, task };
				let replaced = self.0.lock().insert(customer_id.clone(), pending);

				if replaced.is_some() {
					tracing::info!(customer = %customer_id, "Replaced a pending login.");
				}

				Ok(LoginStatus::Verify { verify_url: verify_url.into() })
			},
			// The flow finished without asking for a code.
			Err(_) => {
				let client = join(task).await?;

				manager.remember(customer_id, client);

				Ok(LoginStatus::Success)
			},
		}
	}

	/// Hands `code` to the pending login of `customer_id` and waits for it to finish.
	pub async fn finish(
		&self,
		manager: &SessionManager,
		customer_id: &str,
		code: &str,
		deadline: Deadline,
	) -> Result<LoginStatus> {
		let (customer_id, _) = manager.resolve(customer_id)?;
		let guard = manager.guard(&customer_id);
		// A logout that got here first has already dropped the pending login.
		let _locked = guard.lock().await;
		let pending = self
			.0
			.lock()
			.remove(&customer_id)
			.ok_or_else(|| Error::LoginNotStarted { customer_id: customer_id.to_string() })?;
		let verification = Verification { code: code.to_owned(), deadline: Some(deadline) };

		// The flow already gave up waiting.
		if pending.code_tx.send(verification).is_err() {
			return Err(Error::UserAbort);
		}

		let client = deadline.run(join(pending.task)).await?;

		manager.remember(customer_id, client);

		Ok(LoginStatus::Success)
	}

	/// Logs `customer_id` out and drops its pending login in one step.
	pub async fn logout(&self, manager: &SessionManager, customer_id: &str) -> Result<()> {
		manager
			.release_client_with(customer_id, |customer_id| {
				if self.abandon(customer_id) {
					tracing::info!(customer = %customer_id, "Abandoned a pending login.");
				}
			})
			.await
	}

	/// Drops any pending login of `customer_id`.
	pub fn abandon(&self, customer_id: &str) -> bool {
		self.0.lock().remove(customer_id).is_some()
	}

	/// Returns `true` while a login for `customer_id` waits for its code.
	pub fn is_pending(&self, customer_id: &str) -> bool {
		self.0.lock().contains_key(customer_id)
	}
}

async fn join(task: JoinHandle<Result<AuthorizedClient>>) -> Result<AuthorizedClient> {
	task.await.map_err(|e| {
		tracing::warn!(error = %e, "Login task did not complete.");

		Error::Cancelled
	})?
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_bodies_match_the_wire_shape() {
		let url = Url::parse("https://us.etrade.com/e/t/etws/authorize?key=K&token=T")
			.expect("Fixture URL should parse.");

		assert_eq!(
			serde_json::to_value(LoginStatus::Verify { verify_url: url.to_string() })
				.expect("Status should serialize."),
			serde_json::json!({ "status": "verify", "verifyUrl": url.as_str() })
		);
		assert_eq!(
			serde_json::to_value(LoginStatus::Success).expect("Status should serialize."),
			serde_json::json!({ "status": "success" })
		);
	}
}
