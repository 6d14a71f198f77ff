//! Interactive portal shell. Every command that opens a view goes through the
//! access gate first; forms are filled one prompt per field.

mod input;
mod prompt;
mod views;

use crate::{
    features::{
        auth::{
            client as auth_client,
            guards::{default_view, History, Navigation, View},
            state::{ReconcileOutcome, SessionStore},
            types::UserId,
        },
        declarations::client as declarations_client,
        forms::{
            AdminEditUserForm, AdminUserForm, DeclarationForm, FailureOrigin, FieldSpec, Form,
            FormController, FormFailure, LoginForm, RegisterForm, ResetPasswordForm, SubmitError,
        },
        users::{
            client as users_client,
            listing::{ListingQuery, UserListing},
        },
        validation::rules,
    },
    portal::{short_commit_hash, ApiClient, ApiError, PortalConfig},
};
use anyhow::{Context, Result};
use input::{ShellCommand, HELP};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Args {
    pub config: PortalConfig,
}

/// Runs the shell until `quit` or end of input.
///
/// # Errors
/// Returns an error if the HTTP client can't be built or the terminal fails.
pub async fn execute(args: Args) -> Result<()> {
    let api = ApiClient::new(&args.config).context("failed to build API client")?;
    let session = Arc::new(SessionStore::new(api));

    println!(
        "{} {} ({}) - {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit_hash(),
        args.config.api_base_url
    );

    let reconcile = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            if let ReconcileOutcome::Unreachable(err) = session.reconcile().await {
                eprintln!("Could not verify your session ({err}); continuing signed out.");
            }
        })
    };

    let mut shell = Shell {
        session: Arc::clone(&session),
        history: History::default(),
        listing: UserListing::new(),
        last_query: ListingQuery::default(),
    };
    let result = shell.run().await;

    reconcile.abort();
    if session.is_authenticated() {
        session.save_cookies();
    }
    result
}

struct Shell {
    session: Arc<SessionStore>,
    history: History,
    listing: UserListing,
    last_query: ListingQuery,
}

/// How a form session ended.
enum Filled<R> {
    Submitted(R),
    Cancelled,
    Failed(FormFailure),
}

impl Shell {
    async fn run(&mut self) -> Result<()> {
        println!("{}", views::home(&self.session.state()));
        loop {
            let prompt = format!("{}> ", self.history.current());
            let Some(line) = prompt::line(&prompt).await? else {
                break;
            };
            let command = match input::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };
            if command == ShellCommand::Quit {
                break;
            }
            if let Err(err) = self.handle(command).await {
                println!("Error: {err:#}");
            }
        }
        info!("shell closed");
        Ok(())
    }

    async fn handle(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::WhoAmI => println!("{}", views::whoami(&self.session.state())),
            ShellCommand::Logout => self.logout().await,
            ShellCommand::Back => {
                let state = self.session.state();
                let view = self.history.back(&state);
                println!("Back at {view}.");
                if matches!(view, View::Home | View::Dashboard) {
                    self.render(view, &command).await?;
                }
            }
            ShellCommand::Quit => {}
            _ => {
                let Some(view) = command.view() else {
                    return Ok(());
                };
                match self.open(view).await {
                    Some(granted) if granted == view => self.render(view, &command).await?,
                    Some(View::Login) => println!("Please log in first (`login`)."),
                    Some(other) => {
                        println!("You can't open {view}; showing {other} instead.");
                        self.render(other, &ShellCommand::Home).await?;
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    /// Applies the gate, waiting out reconciliation if it is still running.
    async fn open(&mut self, view: View) -> Option<View> {
        let state = self.session.state();
        let navigation = match self.history.navigate(view, &state) {
            Navigation::Pending => {
                println!("Checking access...");
                let state = self.session.wait_resolved().await;
                self.history.navigate(view, &state)
            }
            resolved => resolved,
        };
        match navigation {
            Navigation::Render(view) => Some(view),
            Navigation::Pending => None,
        }
    }

    async fn render(&mut self, view: View, command: &ShellCommand) -> Result<()> {
        match view {
            View::Home => println!("{}", views::home(&self.session.state())),
            View::Login => self.login().await?,
            View::Register => self.register().await?,
            View::ResetPassword => self.reset_password().await?,
            View::Dashboard => self.dashboard().await,
            View::NewDeclaration => self.declare().await?,
            View::AdminUsers => self.admin_users(command).await,
            View::AdminCreateUser => self.create_user().await?,
            View::AdminEditUser => self.edit_user(command).await?,
        }
        Ok(())
    }

    async fn login(&mut self) -> Result<()> {
        let controller = FormController::<LoginForm>::new();
        match self.fill(&controller, LoginForm::FIELDS).await? {
            Filled::Submitted(response) => {
                if let Some(message) = &response.message {
                    debug!(%message, "login accepted");
                }
                self.session.establish(response.user);
                let state = self.session.state();
                println!("{}", views::whoami(&state));
                let landing = default_view(&state);
                self.history.replace_with(landing, &state);
                if landing == View::AdminUsers {
                    self.admin_users(&ShellCommand::Users {
                        page: 1,
                        search: String::new(),
                    })
                    .await;
                } else {
                    self.dashboard().await;
                }
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("Login cancelled."),
        }
        Ok(())
    }

    async fn register(&mut self) -> Result<()> {
        println!(
            "Document types: {}",
            crate::features::users::types::DocumentType::ALL
                .map(|kind| kind.as_str())
                .join(", ")
        );
        let controller = FormController::<RegisterForm>::new();
        match self.fill(&controller, RegisterForm::FIELDS).await? {
            Filled::Submitted(response) => {
                println!(
                    "{}",
                    response
                        .message
                        .as_deref()
                        .unwrap_or("Account created.")
                );
                println!("You can now log in with `login`.");
                let state = self.session.state();
                self.history.replace_with(View::Login, &state);
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("Registration cancelled."),
        }
        Ok(())
    }

    async fn reset_password(&mut self) -> Result<()> {
        let Some(email) = self.ask("Email: ").await? else {
            println!("Password reset cancelled.");
            return Ok(());
        };
        if let Some(message) = rules::email(&email) {
            println!("{message}");
            return Ok(());
        }
        match auth_client::find_mail(self.session.api(), &email).await {
            Ok(true) => {}
            Ok(false) => {
                println!("No account uses that email address.");
                return Ok(());
            }
            Err(err) => {
                println!("{}", FormFailure::from_api_error(&err).message);
                return Ok(());
            }
        }

        let controller = FormController::<ResetPasswordForm>::new();
        controller.set_field("mail", email);
        let password_fields = &ResetPasswordForm::FIELDS[1..];
        match self.fill(&controller, password_fields).await? {
            Filled::Submitted(()) => {
                println!("Password updated. You can now log in with `login`.");
                let state = self.session.state();
                self.history.replace_with(View::Login, &state);
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("Password reset cancelled."),
        }
        Ok(())
    }

    async fn dashboard(&mut self) {
        match declarations_client::list_declarations(self.session.api()).await {
            Ok(list) => println!("{}", views::declarations(&list)),
            Err(err) => self.report(&err),
        }
    }

    async fn declare(&mut self) -> Result<()> {
        println!(
            "Marital status options: {}",
            crate::features::declarations::types::MaritalStatus::ALL
                .map(|status| status.as_str())
                .join(", ")
        );
        let controller = FormController::<DeclarationForm>::new();
        match self.fill(&controller, DeclarationForm::FIELDS).await? {
            Filled::Submitted(_) => {
                if let Some(notice) = controller.take_notice() {
                    println!("{notice}");
                }
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("Declaration discarded."),
        }
        Ok(())
    }

    async fn create_user(&mut self) -> Result<()> {
        let controller = FormController::<AdminUserForm>::new();
        match self.fill(&controller, AdminUserForm::FIELDS).await? {
            Filled::Submitted(_) => {
                if let Some(notice) = controller.take_notice() {
                    println!("{notice}");
                }
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("User creation cancelled."),
        }
        Ok(())
    }

    async fn edit_user(&mut self, command: &ShellCommand) -> Result<()> {
        let ShellCommand::EditUser(user_id) = command else {
            println!("Usage: edit <id>");
            return Ok(());
        };
        let user = match users_client::get_user(self.session.api(), user_id).await {
            Ok(user) => user,
            Err(err) => {
                self.admin_call_failed(&err).await;
                return Ok(());
            }
        };

        println!(
            "Editing {} <{}>. Press enter to keep a value; leave the password blank to keep it.",
            user.display_name, user.email
        );
        let controller = FormController::with_form(AdminEditUserForm::for_user(&user));
        match self.fill_prefilled(&controller, AdminEditUserForm::FIELDS).await? {
            Filled::Submitted(response) => {
                println!(
                    "{}",
                    response.message.as_deref().unwrap_or("User updated.")
                );
                let state = self.session.state();
                self.history.replace_with(View::AdminUsers, &state);
                self.admin_users(command).await;
            }
            Filled::Failed(failure) => println!("{}", failure.message),
            Filled::Cancelled => println!("No changes saved."),
        }
        Ok(())
    }

    async fn admin_users(&mut self, command: &ShellCommand) {
        let query = match command {
            ShellCommand::Users { page, search } => ListingQuery {
                page: *page,
                search: search.clone(),
            },
            ShellCommand::NextPage => {
                if !self.listing.current().is_some_and(|view| view.has_more) {
                    println!("No more pages.");
                    return;
                }
                ListingQuery {
                    page: self.last_query.page + 1,
                    search: self.last_query.search.clone(),
                }
            }
            ShellCommand::PrevPage => {
                if self.last_query.page <= 1 {
                    println!("Already on the first page.");
                    return;
                }
                ListingQuery {
                    page: self.last_query.page - 1,
                    search: self.last_query.search.clone(),
                }
            }
            ShellCommand::Toggle(user_id) => {
                self.toggle(user_id).await;
                self.last_query.clone()
            }
            _ => self.last_query.clone(),
        };

        match self.listing.fetch(self.session.api(), query.clone()).await {
            Ok(Some(view)) => {
                self.last_query = query;
                println!("{}", views::users(&view));
            }
            Ok(None) => debug!("user listing superseded by a newer request"),
            Err(err) => self.admin_call_failed(&err).await,
        }
    }

    /// Failed admin-only read. A 403 means the server no longer treats the
    /// session as admin, so the view is left for the dashboard.
    async fn admin_call_failed(&mut self, err: &ApiError) {
        if !err.is_forbidden() {
            self.report(err);
            return;
        }
        let denied = self.history.current();
        let landing = self.history.refused();
        warn!(view = %denied, "admin view refused by the server");
        println!("You don't have access to {denied}; showing {landing} instead.");
        self.dashboard().await;
    }

    async fn toggle(&self, user_id: &UserId) {
        match users_client::toggle_status(self.session.api(), user_id).await {
            Ok(response) => println!(
                "{}",
                response
                    .message
                    .as_deref()
                    .unwrap_or("User status changed.")
            ),
            Err(err) => self.report(&err),
        }
    }

    async fn logout(&mut self) {
        if self.session.state().is_verifying() {
            println!("Checking access...");
        }
        if self.session.wait_resolved().await.session().is_none() {
            println!("You are not signed in.");
            return;
        }
        self.session.clear().await;
        let state = self.session.state();
        self.history.replace_with(View::Home, &state);
        println!("Signed out.");
    }

    /// Prints a failed API call; a 401 also drops the session.
    fn report(&self, err: &ApiError) {
        if self.session.handle_denial(err) {
            println!("Your session has expired. Please log in again (`login`).");
            return;
        }
        let failure = FormFailure::from_api_error(err);
        if failure.origin == FailureOrigin::ServerFault {
            warn!(error = %err, "server fault");
        }
        println!("{}", failure.message);
    }

    async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        Ok(prompt::line(prompt)
            .await?
            .filter(|value| value.trim() != prompt::CANCEL))
    }

    /// Prompts for `fields`, then submits. After a rejection only the fields
    /// with errors are asked again.
    async fn fill<F: Form>(
        &self,
        controller: &FormController<F>,
        fields: &[FieldSpec],
    ) -> Result<Filled<F::Response>> {
        self.fill_with(controller, fields, false).await
    }

    /// `fill` for a form that starts from a record's current values: each
    /// prompt shows the value and a blank answer keeps it.
    async fn fill_prefilled<F: Form>(
        &self,
        controller: &FormController<F>,
        fields: &[FieldSpec],
    ) -> Result<Filled<F::Response>> {
        self.fill_with(controller, fields, true).await
    }

    async fn fill_with<F: Form>(
        &self,
        controller: &FormController<F>,
        fields: &[FieldSpec],
        keep_blank: bool,
    ) -> Result<Filled<F::Response>> {
        let mut pending: Vec<_> = fields.to_vec();
        loop {
            for spec in &pending {
                let current = if keep_blank && !spec.secret {
                    controller.form().value(spec.name).map(str::to_string)
                } else {
                    None
                };
                let label = match (current, spec.optional) {
                    (Some(current), _) => format!("{} [{current}]: ", spec.label),
                    (None, true) => format!("{} (optional): ", spec.label),
                    (None, false) => format!("{}: ", spec.label),
                };
                let value = if spec.secret {
                    prompt::secret(&label).await?
                } else {
                    prompt::line(&label).await?
                };
                match value {
                    Some(value) if value.trim() == prompt::CANCEL => {
                        return Ok(Filled::Cancelled)
                    }
                    Some(value) if keep_blank && value.trim().is_empty() => {}
                    Some(value) => {
                        controller.set_field(spec.name, value);
                    }
                    None => return Ok(Filled::Cancelled),
                }
            }

            match controller.submit(&self.session).await {
                Ok(response) => return Ok(Filled::Submitted(response)),
                Err(SubmitError::InFlight) => {
                    println!("Still sending the previous submission.");
                    return Ok(Filled::Cancelled);
                }
                Err(SubmitError::Invalid(errors)) => {
                    println!("{}", views::field_errors(F::FIELDS, &errors));
                }
                Err(SubmitError::Failed(failure)) => {
                    let errors = controller.errors();
                    if failure.origin != FailureOrigin::Rejected || errors.is_empty() {
                        return Ok(Filled::Failed(failure));
                    }
                    println!("{}", failure.message);
                    println!("{}", views::field_errors(F::FIELDS, &errors));
                }
            }

            let errors = controller.errors();
            let retype_confirmation = errors.contains("password");
            pending = fields
                .iter()
                .filter(|spec| {
                    errors.contains(spec.name)
                        || (retype_confirmation && spec.name == "confirm_password")
                })
                .copied()
                .collect();
            if pending.is_empty() {
                // Errors on fields this prompt does not own; nothing to re-ask.
                return Ok(Filled::Failed(FormFailure::new(
                    FailureOrigin::Rejected,
                    "The form could not be submitted.",
                )));
            }
        }
    }
}
