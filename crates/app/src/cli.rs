//! Command definitions and handlers.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use stackbase_application::{AuthProvider, AuthProviderError, AuthorizedFetchError};
use stackbase_domain::{Header, HttpMethod, LoginParams, RequestOptions, ResetPasswordParams};
use stackbase_infrastructure::{SettingsLoader, Stackbase};
use url::Url;

const INVALID_OAUTH_STATE: &str = "INVALID_OAUTH_STATE";

/// Command line interface for Stackbase
#[derive(Parser, Debug)]
#[command(name = "stackbase")]
#[command(about = "Talk to a Stack Auth protected REST backend")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// File keeping the session cookies between runs
    #[arg(long, global = true)]
    pub cookies: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a REST resource, e.g. `posts?select=id,title`
    Fetch {
        resource: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: HttpMethod,
        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
        /// Extra request header, e.g. `Prefer: count=exact`
        #[arg(short = 'H', long = "header")]
        headers: Vec<Header>,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Show how a page URL is routed: recovery redirect and access check
    Callback { url: String },
    /// Print the signed-in identity and permissions
    Whoami {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Print the URL that starts an OAuth sign-in
    Oauth { provider: String },
    /// Finish an OAuth sign-in from the URL the provider redirected to
    OauthCallback { url: String },
    /// Send a password reset email
    ForgotPassword {
        email: String,
        /// Where the reset link leads
        #[arg(long)]
        redirect_to: Option<String>,
    },
}

/// Optional sign-in before the request.
#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(long, requires = "password")]
    email: Option<String>,
    #[arg(long, requires = "email")]
    password: Option<String>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        cookies,
        command,
    } = cli;

    let mut loader = SettingsLoader::new();
    if let Some(path) = &config {
        loader = loader.with_file(path);
    }
    let settings = loader.load().context("failed to load configuration")?;
    let stackbase = Stackbase::from_settings(&settings)?;

    let jar = stackbase.identity().token_store();
    if let Some(path) = &cookies {
        jar.load_file(path)
            .with_context(|| format!("failed to read cookies from {}", path.display()))?;
    }
    let result = execute(&stackbase, command).await;
    if let Some(path) = &cookies {
        jar.save_file(path)
            .with_context(|| format!("failed to write cookies to {}", path.display()))?;
    }
    result
}

async fn execute(stackbase: &Stackbase, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Fetch {
            resource,
            method,
            body,
            headers,
            credentials,
        } => {
            credentials.sign_in(stackbase).await?;
            let mut options = RequestOptions::new(method);
            for header in headers {
                options = options.with_header(header.name, header.value);
            }
            if let Some(body) = body {
                options = options.with_body(body);
            }
            fetch(stackbase, &resource, options).await
        }
        Command::Callback { url } => callback(stackbase, &url).await,
        Command::Whoami { credentials } => {
            credentials.sign_in(stackbase).await?;
            whoami(stackbase).await
        }
        Command::Oauth { provider } => oauth(stackbase, provider).await,
        Command::OauthCallback { url } => oauth_callback(stackbase, &url).await,
        Command::ForgotPassword { email, redirect_to } => {
            let mut params = ResetPasswordParams::new(email);
            if let Some(redirect_to) = redirect_to {
                params = params.with_redirect_to(redirect_to);
            }
            stackbase.auth().reset_password(params).await?;
            println!("reset email sent");
            Ok(())
        }
    }
}

async fn fetch(stackbase: &Stackbase, resource: &str, options: RequestOptions) -> anyhow::Result<()> {
    match stackbase.fetch_resource(resource, Some(options)).await {
        Ok(response) => {
            if let Some(total) = response.total_count() {
                tracing::info!(total, "rows available");
            }
            let output = response.json.unwrap_or(Value::String(response.body));
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(AuthorizedFetchError::Fetch(error)) => {
            if stackbase.auth().check_error(&error.auth_report()).await.is_err() {
                stackbase.auth().logout().await?;
                bail!("{error}: session is no longer valid, sign in again");
            }
            Err(error.into())
        }
        Err(error) => Err(error.into()),
    }
}

async fn callback(stackbase: &Stackbase, url: &str) -> anyhow::Result<()> {
    stackbase.location().navigate_to_url(url)?;

    match stackbase.auth().handle_callback().await? {
        Some(redirect) => println!("callback redirect: {}", redirect.to_href()),
        None => println!("callback redirect: none"),
    }
    match stackbase.auth().check_auth().await {
        Ok(()) => println!("access: granted"),
        Err(error) => match error.redirect() {
            Some(redirect) => println!("access: redirect to {}", redirect.to_href()),
            None if error.show_message() => println!("access: denied ({error})"),
            None => println!("access: denied"),
        },
    }
    Ok(())
}

async fn whoami(stackbase: &Stackbase) -> anyhow::Result<()> {
    let identity = stackbase.auth().get_identity().await?;
    println!("{}", serde_json::to_string_pretty(&identity)?);
    if let Some(permissions) = stackbase.auth().get_permissions().await? {
        println!("{}", serde_json::to_string_pretty(&permissions)?);
    }
    Ok(())
}

async fn oauth(stackbase: &Stackbase, provider: String) -> anyhow::Result<()> {
    match stackbase.auth().login(LoginParams::oauth(provider)).await {
        Err(AuthProviderError::OAuthRedirectPending { url, .. }) => {
            println!("{url}");
            Ok(())
        }
        Err(error) => Err(error.into()),
        Ok(()) => bail!("OAuth sign-in completed without a redirect"),
    }
}

async fn oauth_callback(stackbase: &Stackbase, url: &str) -> anyhow::Result<()> {
    let callback = Url::parse(url).with_context(|| format!("invalid callback URL: {url}"))?;

    match stackbase.identity().complete_oauth_callback(&callback).await {
        Ok(()) => {
            println!("signed in");
            Ok(())
        }
        Err(error) if error.code() == Some(INVALID_OAUTH_STATE) => bail!(
            "{error}: start the sign-in with `stackbase oauth` using the same --cookies file"
        ),
        Err(error) => Err(error.into()),
    }
}
