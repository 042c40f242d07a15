//! Login command implementation.

use anyhow::Result;
use roster_business::{
    AuthError, Form, FormError, LoginField, LoginForm, Route, RouteGuard, sign_in,
};
use tracing::{error, info, instrument};

use crate::commands::fail;
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, fill_form};

#[instrument(skip_all, name = "login")]
pub async fn run_login(
    mut ctx: AppContext,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let out = Output::new();

    if RouteGuard::resolve(Route::Login, &ctx.session) == Route::Dashboard {
        out.info("Already logged in. Run `roster logout` to switch accounts.");
        return Ok(());
    }

    let mut form = Form::<LoginForm>::new();
    if let Some(email) = email {
        form.on_change(LoginField::Email, email);
    }
    if let Some(password) = password {
        form.on_change(LoginField::Password, password);
    }
    if ctx.interactive {
        out.header("Login to Roster");
        fill_form(&mut form, Ask::Missing)?;
    }

    loop {
        match sign_in(&ctx.api, &mut ctx.session, &mut form).await {
            Ok(_) => break,
            Err(AuthError::Form(FormError::Invalid { .. })) => {
                out.error("Please fix the following:");
                out.field_errors(form.errors());
                if !ctx.interactive {
                    std::process::exit(1);
                }
                fill_form(&mut form, Ask::Invalid)?;
            }
            Err(err) => {
                error!("Login failed: {err}");
                let message = form
                    .submit_error()
                    .map_or_else(|| err.user_message(), str::to_owned);
                fail(&out, message);
            }
        }
    }

    info!("Logged in");
    out.success("Logged in");
    out.labeled("Session", ctx.session_path.display());
    Ok(())
}
