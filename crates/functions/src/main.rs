use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use ironlog_functions::{
    Functions, auth::JwkVerifier, config::Config, identity::IdentityToolkitAdmin,
    mail::SmtpMailer, routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let client = reqwest::Client::new();

    let functions = Arc::new(Functions {
        verifier: JwkVerifier::new(client.clone(), &config.jwk_url, &config.project_id),
        identity: IdentityToolkitAdmin::new(
            client,
            &config.identity_toolkit_url,
            &config.project_id,
            &config.admin_access_token,
        ),
        mailer: SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            &config.smtp_user,
            &config.smtp_password,
            &config.mail_from,
        )
        .context("failed to set up SMTP transport")?,
        settings: config.settings(),
    });

    let app = routes::router(functions).layer(config.cors_layer());
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    info!("listening on {}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
