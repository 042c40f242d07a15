//! Register command implementation.

use anyhow::Result;
use roster_business::{
    AdminRole, AuthError, Form, FormError, REGISTERED_MESSAGE, RegisterField, RegisterForm,
    Route, register,
};
use tracing::{error, instrument};

use crate::commands::fail;
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, fill_form};

pub struct Registration {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
}

fn prefilled(registration: Registration) -> Form<RegisterForm> {
    let mut form = Form::<RegisterForm>::with_default_role();
    let fields = [
        (RegisterField::Name, registration.name),
        (RegisterField::Phone, registration.phone),
        (RegisterField::Email, registration.email),
        (RegisterField::Password, registration.password),
        (
            RegisterField::Role,
            registration.role.map(|role| role.as_str().to_owned()),
        ),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            form.on_change(field, value);
        }
    }
    form
}

#[instrument(skip_all, name = "register")]
pub async fn run_register(mut ctx: AppContext, registration: Registration) -> Result<()> {
    let out = Output::new();

    let mut form = prefilled(registration);
    if ctx.interactive {
        out.header("Create a Roster admin account");
        fill_form(&mut form, Ask::Missing)?;
    }

    let route = loop {
        match register(&ctx.api, &mut ctx.session, &mut form).await {
            Ok(route) => break route,
            Err(AuthError::Form(FormError::Invalid { .. })) => {
                out.error("Please fix the following:");
                out.field_errors(form.errors());
                if !ctx.interactive {
                    std::process::exit(1);
                }
                fill_form(&mut form, Ask::Invalid)?;
            }
            Err(err) => {
                error!("Registration failed: {err}");
                let message = form
                    .submit_error()
                    .map_or_else(|| err.user_message(), str::to_owned);
                fail(&out, message);
            }
        }
    };

    match route {
        Route::Dashboard => {
            out.success("Registered and logged in");
            out.labeled("Session", ctx.session_path.display());
        }
        Route::Login | Route::Register => {
            out.success(REGISTERED_MESSAGE);
            out.dim("Run `roster login` to sign in.");
        }
    }
    Ok(())
}
