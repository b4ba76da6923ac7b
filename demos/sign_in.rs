//! Demonstrates a full interactive sign-in: prints the authorize URL, waits for the redirect URL
//! to be pasted back, exchanges the code, and prints the signed-in user's Graph profile.
//!
//! Replace the tenant and client identifiers with your own Azure AD app registration before
//! running; the registration must list the redirect URI below as a public-client redirect.

// std
use std::io::{BufRead, Write as _, stdin, stdout};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use azure_graph_auth::{
	auth::{ClientId, ScopeSet, TenantId},
	browser::{BrowserSession, RedirectResponse, SessionFuture, redirect_params_from_url},
	config::AppConfig,
	flow::ReqwestAuthClient,
};

/// Browser stand-in that asks the operator to drive the consent hop by hand.
struct PasteRedirectBrowser;
impl BrowserSession for PasteRedirectBrowser {
	fn start<'a>(&'a self, authorize_url: &'a Url, _return_url: &'a Url) -> SessionFuture<'a> {
		Box::pin(async move {
			println!("Open the following URL in a browser and sign in:\n\n  {authorize_url}\n");
			print!("Paste the redirect URL here (empty line to cancel): ");

			stdout().flush()?;

			let mut line = String::new();

			stdin().lock().read_line(&mut line)?;

			let line = line.trim();

			if line.is_empty() {
				return Ok(RedirectResponse::Cancelled);
			}

			let redirect = Url::parse(line)?;

			Ok(RedirectResponse::Redirect { params: redirect_params_from_url(&redirect) })
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = AppConfig::builder(
		TenantId::new("common")?,
		ClientId::new("00000000-0000-0000-0000-000000000000")?,
		ScopeSet::new(["openid", "profile", "User.Read"])?,
		Url::parse("https://login.microsoftonline.com/common/oauth2/nativeclient")?,
	)
	.build()?;
	let client = ReqwestAuthClient::new();

	match client.authenticate(&config, &PasteRedirectBrowser).await {
		Ok(profile) => {
			println!("Signed in successfully.");
			println!("  id:                  {}", profile.id.as_deref().unwrap_or("<none>"));
			println!(
				"  displayName:         {}",
				profile.display_name.as_deref().unwrap_or("<none>")
			);
			println!(
				"  userPrincipalName:   {}",
				profile.user_principal_name.as_deref().unwrap_or("<none>")
			);
			println!("  mail:                {}", profile.mail.as_deref().unwrap_or("<none>"));
		},
		Err(e) => println!("Sign-in failed: {e}"),
	}

	Ok(())
}
