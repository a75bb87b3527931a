//! Client facade tying configuration, the shared token cache, and the service handles together.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::MpesaConfig,
	executor::RequestExecutor,
	http::HttpTransport,
	operations::{BuildContext, Operation},
	payload::Payload,
	security::{PreEncrypted, SecurityCredentialProvider, SharedCredentialProvider},
	services::{
		AccountBalanceService, BusinessToCustomerService, CustomerToBusinessService,
		OperationRequest, ReversalService, StkService, TransactionStatusService,
	},
	token::TokenManager,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestMpesa = Mpesa<ReqwestTransport>;

/// M-Pesa client.
///
/// Every client built from the same cache path shares one token with every other client and
/// process using that path. Configuration is frozen at construction; build a new client to
/// change credentials or the cache location.
pub struct Mpesa<T>
where
	T: ?Sized + HttpTransport,
{
	executor: RequestExecutor<T>,
	credentials: SharedCredentialProvider,
}
impl<T> Mpesa<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over a caller-provided transport.
	pub fn with_transport(config: MpesaConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		let executor = RequestExecutor::new(Arc::new(config), transport.into())?;

		Ok(Self { executor, credentials: Arc::new(PreEncrypted) })
	}

	/// Creates a client around a prepared token manager (custom stores or locks).
	pub fn with_token_manager(
		config: MpesaConfig,
		transport: impl Into<Arc<T>>,
		tokens: TokenManager<T>,
	) -> Self {
		let executor = RequestExecutor::with_tokens(Arc::new(config), transport.into(), tokens);

		Self { executor, credentials: Arc::new(PreEncrypted) }
	}

	/// Replaces the security credential strategy (defaults to [`PreEncrypted`]).
	pub fn with_security_credential_provider(
		mut self,
		provider: impl 'static + SecurityCredentialProvider,
	) -> Self {
		self.credentials = Arc::new(provider);

		self
	}

	/// Frozen configuration.
	pub fn config(&self) -> &MpesaConfig {
		self.executor.config()
	}

	/// Shared token manager.
	pub fn tokens(&self) -> &TokenManager<T> {
		self.executor.tokens()
	}

	/// Returns a valid access token from the shared cache, refreshing it when needed.
	pub async fn access_token(&self) -> Result<AccessToken> {
		self.executor.tokens().access_token().await
	}

	/// Removes the shared cached token; the next call refreshes it.
	pub async fn clear_token_cache(&self) -> Result<()> {
		self.executor.tokens().invalidate().await
	}

	/// STK push handle.
	pub fn stk(&self) -> StkService<'_, T> {
		StkService::new(self)
	}

	/// C2B handle.
	pub fn customer_to_business(&self) -> CustomerToBusinessService<'_, T> {
		CustomerToBusinessService::new(self)
	}

	/// B2C handle.
	pub fn business_to_customer(&self) -> BusinessToCustomerService<'_, T> {
		BusinessToCustomerService::new(self)
	}

	/// Account balance handle.
	pub fn account_balance(&self) -> AccountBalanceService<'_, T> {
		AccountBalanceService::new(self)
	}

	/// Transaction status handle.
	pub fn transaction_status(&self) -> TransactionStatusService<'_, T> {
		TransactionStatusService::new(self)
	}

	/// Reversal handle.
	pub fn reversal(&self) -> ReversalService<'_, T> {
		ReversalService::new(self)
	}

	/// Sends a typed request.
	pub async fn send<R>(&self, request: &R) -> Result<Value>
	where
		R: OperationRequest,
	{
		self.execute(&R::OPERATION, &request.to_input()).await
	}

	/// Builds `operation`'s payload from wire-keyed `input` and sends it.
	pub async fn execute(&self, operation: &Operation, input: &Payload) -> Result<Value> {
		let payload = self.build(operation, input, OffsetDateTime::now_utc())?;

		self.executor.execute(operation.path, &payload).await
	}

	/// Builds `operation`'s payload as it would be sent at `now`, without sending it.
	pub fn build(&self, operation: &Operation, input: &Payload, now: OffsetDateTime) -> Result<Payload> {
		let ctx = BuildContext { config: self.config(), credentials: &*self.credentials, now };

		Ok(operation.build(input, &ctx)?)
	}
}
#[cfg(feature = "reqwest")]
impl Mpesa<ReqwestTransport> {
	/// Creates a client with a reqwest transport bounded by the configured request timeout.
	pub fn new(config: MpesaConfig) -> Result<Self> {
		let transport = ReqwestTransport::with_timeout(config.request_timeout)?;

		Self::with_transport(config, transport)
	}
}
impl<T> Debug for Mpesa<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Mpesa").field("executor", &self.executor).finish()
	}
}
