//! Line-oriented terminal front end.
//!
//! The shell keeps one [`Route`] at a time and owns the contexts that route
//! needs. Leaving a route drops its contexts, which cancels their requests.

use std::time::Duration;

use quire_core::{Edit, EditField, Revision, Route};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::api::DocsApi;
use crate::context::{
    CollaboratorSearch, DashboardContext, DocumentContext, SaveOutcome, SessionContext,
};
use crate::error::ActionError;

async fn say<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

async fn report<W: AsyncWrite + Unpin>(
    out: &mut W,
    result: Result<(), ActionError>,
    success: &str,
) -> std::io::Result<()> {
    match result {
        Ok(()) => say(out, success).await,
        Err(err) => say(out, &format!("Error: {}", err.message())).await,
    }
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

fn help_for(route: &Route) -> &'static [&'static str] {
    match route {
        Route::Login => &["login <email> <password>", "register"],
        Route::Register => &["register <username> <email> <password>", "login"],
        Route::Dashboard => &["docs", "new", "open <id>", "delete <id>", "logout"],
        Route::CreateDocument => &["create <title> | <content>", "back"],
        Route::Document(_) => &[
            "show",
            "title <text>",
            "write <text>",
            "save",
            "collab add <user id>",
            "collab rm <user id>",
            "collab list",
            "search <query>",
            "versions",
            "restore <version id>",
            "rmversion <version id>",
            "close",
            "back",
            "logout",
        ],
    }
}

/// Interactive session over any line reader and writer
pub struct Shell<A, R, W> {
    session: SessionContext<A>,
    search_debounce: Duration,
    route: Route,
    /// Buffer revision the user last saw; edits are made against it
    viewed: Revision,
    dashboard: Option<DashboardContext<A>>,
    editor: Option<DocumentContext<A>>,
    search: Option<CollaboratorSearch<A>>,
    lines: Lines<R>,
    out: W,
}

impl<A, R, W> Shell<A, R, W>
where
    A: DocsApi + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: SessionContext<A>, search_debounce: Duration, input: R, out: W) -> Self {
        Self {
            session,
            search_debounce,
            route: Route::Login,
            viewed: Revision::default(),
            dashboard: None,
            editor: None,
            search: None,
            lines: input.lines(),
            out,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until end of input or `quit`
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.session.initialize().await;
        let landing = Route::landing(self.session.snapshot().await.is_authenticated());
        self.navigate(landing).await?;
        self.enforce_session().await?;

        loop {
            self.out
                .write_all(format!("{} > ", self.route).as_bytes())
                .await?;
            self.out.flush().await?;

            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "quit" | "exit") {
                break;
            }
            self.dispatch(line).await?;
            self.enforce_session().await?;
        }

        self.leave();
        self.session.teardown();
        Ok(())
    }

    fn leave(&mut self) {
        self.viewed = Revision::default();
        self.dashboard = None;
        self.editor = None;
        self.search = None;
    }

    async fn navigate(&mut self, route: Route) -> anyhow::Result<()> {
        self.leave();
        tracing::debug!(%route, "Navigating");
        self.route = route.clone();

        match route {
            Route::Login => {
                say(&mut self.out, "Log in with: login <email> <password>").await?;
            }
            Route::Register => {
                say(&mut self.out, "Create an account with: register <username> <email> <password>")
                    .await?;
            }
            Route::Dashboard => {
                let mut dashboard = DashboardContext::new(self.session.clone());
                dashboard.load().await;
                self.dashboard = Some(dashboard);
                self.render_dashboard().await?;
            }
            Route::CreateDocument => {
                self.dashboard = Some(DashboardContext::new(self.session.clone()));
                say(&mut self.out, "New document: create <title> | <content>").await?;
            }
            Route::Document(id) => {
                let mut editor = DocumentContext::new(id, self.session.clone());
                editor.initialize().await;
                self.editor = Some(editor);
                self.search = Some(CollaboratorSearch::new(
                    self.session.clone(),
                    self.search_debounce,
                ));
                self.render_document().await?;
            }
        }
        Ok(())
    }

    /// Send the user back to login once the session is gone
    async fn enforce_session(&mut self) -> anyhow::Result<()> {
        if !self.route.requires_session() || self.session.is_loading().await {
            return Ok(());
        }
        if self.session.user().await.is_none() {
            say(&mut self.out, "Your session has ended. Please log in again.").await?;
            self.navigate(Route::Login).await?;
        }
        Ok(())
    }

    fn has_open_prompt(&self) -> bool {
        let dashboard = self
            .dashboard
            .as_ref()
            .is_some_and(|d| d.state().is_confirming_delete());
        let editor = self
            .editor
            .as_ref()
            .is_some_and(|e| e.state().has_open_prompt());
        dashboard || editor
    }

    async fn dispatch(&mut self, line: &str) -> anyhow::Result<()> {
        let (command, rest) = split_command(line);
        if command == "help" {
            for line in help_for(&self.route) {
                say(&mut self.out, &format!("  {line}")).await?;
            }
            return Ok(());
        }
        if self.has_open_prompt() {
            return self.answer_prompt(command).await;
        }

        match self.route.clone() {
            Route::Login => self.login_command(command, rest).await,
            Route::Register => self.register_command(command, rest).await,
            Route::Dashboard => self.dashboard_command(command, rest).await,
            Route::CreateDocument => self.create_command(command, rest).await,
            Route::Document(_) => self.document_command(command, rest).await,
        }
    }

    async fn unknown(&mut self, command: &str) -> anyhow::Result<()> {
        say(&mut self.out, &format!("Unknown command '{command}'. Type 'help'.")).await?;
        Ok(())
    }

    async fn answer_prompt(&mut self, answer: &str) -> anyhow::Result<()> {
        let confirmed = match answer {
            "yes" | "y" => true,
            "no" | "n" => false,
            _ => {
                say(&mut self.out, "Please answer yes or no.").await?;
                return Ok(());
            }
        };

        if let Some(dashboard) = self.dashboard.as_mut() {
            if dashboard.state().is_confirming_delete() {
                if confirmed {
                    let result = dashboard.confirm_delete().await;
                    report(&mut self.out, result, "Document deleted.").await?;
                } else {
                    dashboard.cancel_delete();
                }
                return Ok(());
            }
        }

        let Some(editor) = self.editor.as_mut() else {
            return Ok(());
        };
        if editor.state().collaborator_removal.is_open() {
            if confirmed {
                let result = editor.confirm_collaborator_removal().await;
                report(&mut self.out, result, "Collaborator removed successfully!").await?;
            } else {
                editor.cancel_collaborator_removal();
            }
        } else if editor.state().versions.is_confirming_delete() {
            if confirmed {
                let result = editor.confirm_delete().await;
                report(&mut self.out, result, "Version deleted successfully!").await?;
            } else {
                editor.cancel_delete();
            }
        }
        Ok(())
    }

    async fn login_command(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "login" => {
                let mut args = rest.split_whitespace();
                let (Some(email), Some(password)) = (args.next(), args.next()) else {
                    say(&mut self.out, "Usage: login <email> <password>").await?;
                    return Ok(());
                };
                match self.session.sign_in(email, password).await {
                    Ok(user) => {
                        say(&mut self.out, &format!("Welcome, {}!", user.username)).await?;
                        self.navigate(Route::Dashboard).await?;
                    }
                    Err(err) => {
                        say(&mut self.out, &format!("Error: {}", err.message())).await?;
                    }
                }
                Ok(())
            }
            "register" => self.navigate(Route::Register).await,
            other => self.unknown(other).await,
        }
    }

    async fn register_command(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "register" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [username, email, password] = args.as_slice() else {
                    say(&mut self.out, "Usage: register <username> <email> <password>").await?;
                    return Ok(());
                };
                match self.session.register(username, email, password).await {
                    Ok(()) => {
                        say(&mut self.out, "Account created. Please log in.").await?;
                        self.navigate(Route::Login).await?;
                    }
                    Err(err) => {
                        say(&mut self.out, &format!("Error: {}", err.message())).await?;
                    }
                }
                Ok(())
            }
            "login" => self.navigate(Route::Login).await,
            other => self.unknown(other).await,
        }
    }

    async fn dashboard_command(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "docs" => {
                if let Some(dashboard) = self.dashboard.as_mut() {
                    dashboard.load().await;
                }
                self.render_dashboard().await?;
            }
            "new" => self.navigate(Route::CreateDocument).await?,
            "open" if !rest.is_empty() => self.navigate(Route::Document(rest.to_string())).await?,
            "delete" if !rest.is_empty() => {
                if let Some(dashboard) = self.dashboard.as_mut() {
                    dashboard.request_delete(rest);
                    say(&mut self.out, &format!("Delete document {rest}? (yes/no)")).await?;
                }
            }
            "logout" => {
                self.session.logout().await;
                self.navigate(Route::Login).await?;
            }
            other => self.unknown(other).await?,
        }
        Ok(())
    }

    async fn create_command(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "create" => {
                let (title, content) = rest.split_once('|').unwrap_or((rest, ""));
                let title = title.trim();
                if title.is_empty() {
                    say(&mut self.out, "Usage: create <title> | <content>").await?;
                    return Ok(());
                }
                let Some(dashboard) = self.dashboard.as_mut() else {
                    return Ok(());
                };
                match dashboard.create_document(title, content.trim()).await {
                    Ok(document) => {
                        say(&mut self.out, "Document created.").await?;
                        self.navigate(Route::Document(document.id)).await?;
                    }
                    Err(err) => {
                        say(&mut self.out, &format!("Error: {}", err.message())).await?;
                    }
                }
                Ok(())
            }
            "back" | "cancel" => self.navigate(Route::Dashboard).await,
            other => self.unknown(other).await,
        }
    }

    async fn document_command(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "back" => return self.navigate(Route::Dashboard).await,
            "logout" => {
                self.session.logout().await;
                return self.navigate(Route::Login).await;
            }
            "show" => return self.render_document().await,
            "search" => return self.search_users(rest).await,
            _ => {}
        }

        let viewed = self.viewed;
        let Some(editor) = self.editor.as_mut() else {
            return Ok(());
        };
        let out = &mut self.out;
        match (command, rest) {
            ("title" | "write", text) => {
                let field = if command == "title" {
                    EditField::Title
                } else {
                    EditField::Content
                };
                let edit = Edit {
                    field,
                    text: text.to_string(),
                    base: viewed,
                };
                if !editor.apply_edit(edit) {
                    say(
                        out,
                        "The document was replaced since you last viewed it. Type 'show' and edit again.",
                    )
                    .await?;
                }
            }
            ("save", _) => match editor.handle_update().await {
                Ok(SaveOutcome::Saved) => say(out, "Document saved successfully!").await?,
                Ok(SaveOutcome::Unchanged) => say(out, "No changes to save.").await?,
                Err(err) => say(out, &format!("Error: {}", err.message())).await?,
            },
            ("collab", args) => match split_command(args) {
                ("add", id) => {
                    let result = editor.handle_add_collaborator(id).await;
                    report(out, result, "Collaborator added successfully!").await?;
                }
                ("rm", id) if !id.is_empty() => {
                    match editor.request_collaborator_removal(id).await {
                        Ok(()) => say(out, &format!("Remove collaborator {id}? (yes/no)")).await?,
                        Err(err) => say(out, &format!("Error: {}", err.message())).await?,
                    }
                }
                ("list", _) => {
                    if let Err(err) = editor.refresh_collaborators().await {
                        say(out, &format!("Error: {}", err.message())).await?;
                    }
                    return self.render_document().await;
                }
                _ => say(out, "Usage: collab add|rm <user id> or collab list").await?,
            },
            ("versions", _) => {
                if let Err(err) = editor.handle_fetch_versions().await {
                    say(out, &format!("Error: {}", err.message())).await?;
                }
                return self.render_document().await;
            }
            ("restore", id) if !id.is_empty() => {
                let result = editor.handle_restore_version(id).await;
                report(out, result, "Version restored successfully!").await?;
            }
            ("rmversion", id) if !id.is_empty() => match editor.handle_delete_version(id).await {
                Ok(()) => say(out, &format!("Delete version {id}? (yes/no)")).await?,
                Err(err) => say(out, &format!("Error: {}", err.message())).await?,
            },
            ("close", _) => editor.handle_close_versions(),
            (other, _) => {
                let other = other.to_string();
                return self.unknown(&other).await;
            }
        }
        Ok(())
    }

    async fn search_users(&mut self, query: &str) -> anyhow::Result<()> {
        let Some(search) = self.search.as_mut() else {
            return Ok(());
        };
        search.input(query).await;
        search.settle().await;
        let results = search.results().await;

        if results.is_empty() {
            say(&mut self.out, "No users found.").await?;
        }
        for user in results {
            say(&mut self.out, &format!("  {}  {}", user.id, user)).await?;
        }
        Ok(())
    }

    async fn render_dashboard(&mut self) -> anyhow::Result<()> {
        let Some(dashboard) = self.dashboard.as_ref() else {
            return Ok(());
        };
        let state = dashboard.state();
        let mut lines = Vec::new();
        if let Some(error) = state.error() {
            lines.push(format!("Error: {error}"));
        } else if state.documents().is_empty() {
            lines.push("No documents yet. Type 'new' to create one.".to_string());
        } else {
            lines.push("My Documents".to_string());
            for doc in state.documents() {
                lines.push(format!("  {}  {}  (owner: {})", doc.id, doc.title, doc.owner));
            }
        }

        for line in lines {
            say(&mut self.out, &line).await?;
        }
        Ok(())
    }

    async fn render_document(&mut self) -> anyhow::Result<()> {
        let Some(editor) = self.editor.as_ref() else {
            return Ok(());
        };
        let owner = editor.is_owner().await;
        let state = editor.state();
        self.viewed = state.document.revision();
        let mut lines = Vec::new();

        match (state.document.document(), state.document.error()) {
            (_, Some(error)) => lines.push(format!("Error: {error}")),
            (None, None) => lines.push("Loading...".to_string()),
            (Some(doc), None) => {
                let marker = if owner == Some(true) { " (you)" } else { "" };
                lines.push(format!("# {}", state.document.title()));
                lines.push(format!("owner: {}{marker}", doc.owner));
                let collaborators: Vec<String> =
                    doc.collaborators.iter().map(|c| c.to_string()).collect();
                if collaborators.is_empty() {
                    lines.push("collaborators: none".to_string());
                } else {
                    lines.push(format!("collaborators: {}", collaborators.join(", ")));
                }
                lines.push(state.document.content().to_string());
                if state.document.buffer().is_dirty() {
                    lines.push("(unsaved changes)".to_string());
                }
            }
        }

        if state.versions.is_open() {
            lines.push("Version history:".to_string());
            if state.versions.versions().is_empty() {
                lines.push("  no versions".to_string());
            }
            for version in state.versions.versions() {
                let edited_at = version
                    .edited_at
                    .map(|at| at.format(" %Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                lines.push(format!(
                    "  {}  {}  by {}{edited_at}",
                    version.id, version.title, version.edited_by
                ));
            }
        }

        for line in lines {
            say(&mut self.out, &line).await?;
        }
        Ok(())
    }
}
