//! Interactive menu shell over the catalog.
//!
//! Reads one answer per line and writes menus and results as plain text.
//! Core errors are printed and the operator is sent back to the current
//! menu; the shell only ends on "exit" or end of input. While someone is
//! signed in, each read is bounded by the remaining idle time, and a read
//! that runs out expires the session.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::core::{Catalog, Viewer};
use crate::domain::{AgeRating, CatalogError, NewUser, Plan, User, UserId};
use crate::library::{ContentId, ContentItem, ContentKind, NewContent};

/// Why the current menu stopped reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// End of input
    Eof,
    /// Operator chose exit
    Quit,
    /// Idle timeout while signed in
    Expired,
}

/// A signed-in operator
#[derive(Debug, Clone)]
struct Session {
    id: Uuid,
    user: User,
    started_at: DateTime<Utc>,
    last_activity: Instant,
}

impl Session {
    fn viewer(&self) -> Viewer {
        Viewer::from(&self.user)
    }
}

/// Menu-driven front end for a [`Catalog`]
pub struct Shell<R, W> {
    catalog: Arc<Catalog>,
    input: R,
    /// Bytes of the line being read; survives a timed-out read
    line_buf: Vec<u8>,
    output: W,
    session: Option<Session>,
    session_timeout: Duration,
    pending: Option<Interrupt>,
    banner: Vec<String>,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(catalog: Arc<Catalog>, input: R, output: W, session_timeout: Duration) -> Self {
        Self {
            catalog,
            input,
            line_buf: Vec::new(),
            output,
            session: None,
            session_timeout,
            pending: None,
            banner: Vec::new(),
        }
    }

    /// Extra lines printed once at startup
    pub fn with_banner(mut self, lines: Vec<String>) -> Self {
        self.banner = lines;
        self
    }

    /// Run until the operator exits or input ends
    pub async fn run(mut self) -> Result<()> {
        self.say("Welcome to streamcat").await?;
        for line in std::mem::take(&mut self.banner) {
            self.say(&line).await?;
        }

        loop {
            if self.session.is_some() {
                self.member_menu().await?;
            } else {
                self.start_menu().await?;
            }

            match self.pending.take() {
                Some(Interrupt::Eof) | Some(Interrupt::Quit) => break,
                Some(Interrupt::Expired) => {
                    if let Some(session) = self.session.take() {
                        info!(user_id = %session.user.id, session = %session.id, "Session expired");
                    }
                    self.say("").await?;
                    self.say("Session expired after inactivity. Please log in again.")
                        .await?;
                }
                None => {}
            }
        }

        let name = self
            .session
            .as_ref()
            .map(|s| s.user.name.clone())
            .unwrap_or_else(|| "guest".to_string());
        self.say(&format!("Goodbye, {}!", name)).await?;
        self.output.flush().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    async fn start_menu(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("=== streamcat ===").await?;
        self.say("1. Log in").await?;
        self.say("2. Register").await?;
        self.say("3. Browse as guest").await?;
        self.say("4. Exit").await?;

        let Some(choice) = self.read_line("Select an option: ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => self.login().await,
            "2" => self.register().await,
            "3" => self.guest_menu().await,
            "4" => {
                self.pending = Some(Interrupt::Quit);
                Ok(())
            }
            "" => Ok(()),
            _ => self.say("Invalid option.").await,
        }
    }

    async fn guest_menu(&mut self) -> Result<()> {
        loop {
            self.say("").await?;
            self.say("=== Guest browsing ===").await?;
            self.say("1. Browse catalog").await?;
            self.say("2. View item").await?;
            self.say("3. Back").await?;

            let Some(choice) = self.read_line("Select an option: ").await? else {
                return Ok(());
            };

            match choice.as_str() {
                "1" => self.browse().await?,
                "2" => self.view_item().await?,
                "3" => return Ok(()),
                "" => {}
                _ => self.say("Invalid option.").await?,
            }

            if self.pending.is_some() {
                return Ok(());
            }
        }
    }

    async fn member_menu(&mut self) -> Result<()> {
        let name = self
            .session
            .as_ref()
            .map(|s| s.user.name.clone())
            .unwrap_or_default();

        self.say("").await?;
        self.say(&format!("=== Main menu ({}) ===", name)).await?;
        self.say("1. Browse catalog").await?;
        self.say("2. View item").await?;
        self.say("3. Rate item").await?;
        self.say("4. My profile").await?;
        self.say("5. Manage content (admin)").await?;
        self.say("6. Manage users (admin)").await?;
        self.say("7. Log out").await?;
        self.say("8. Exit").await?;

        let Some(choice) = self.read_line("Select an option: ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => self.browse().await,
            "2" => self.view_item().await,
            "3" => self.rate_item().await,
            "4" => self.profile().await,
            "5" if self.is_admin() => self.manage_content().await,
            "6" if self.is_admin() => self.manage_users().await,
            "5" | "6" => self.say("Administrator access required.").await,
            "7" => self.logout().await,
            "8" => {
                self.pending = Some(Interrupt::Quit);
                Ok(())
            }
            "" => Ok(()),
            _ => self.say("Invalid option.").await,
        }
    }

    async fn manage_content(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("=== Manage content ===").await?;
        self.say("1. Add content").await?;
        self.say("2. List all content").await?;
        self.say("3. Back").await?;

        let Some(choice) = self.read_line("Select an option: ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => self.add_content().await,
            "2" => {
                let items = self.catalog.list_all();
                self.print_listing(&items).await
            }
            "3" | "" => Ok(()),
            _ => self.say("Invalid option.").await,
        }
    }

    async fn manage_users(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("=== Manage users ===").await?;
        self.say("1. List users").await?;
        self.say("2. Change plan").await?;
        self.say("3. Add user").await?;
        self.say("4. Back").await?;

        let Some(choice) = self.read_line("Select an option: ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => self.list_users().await,
            "2" => self.change_plan().await,
            "3" => self.add_user().await,
            "4" | "" => Ok(()),
            _ => self.say("Invalid option.").await,
        }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    async fn login(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("--- Log in ---").await?;
        let Some(email) = self.read_line("Email: ").await? else {
            return Ok(());
        };
        let Some(password) = self.read_line("Password: ").await? else {
            return Ok(());
        };

        match self.catalog.login(&email, &password) {
            Ok(user) => {
                let session = Session {
                    id: Uuid::new_v4(),
                    user,
                    started_at: Utc::now(),
                    last_activity: Instant::now(),
                };
                info!(user_id = %session.user.id, session = %session.id, "Session started");
                let greeting = format!("Welcome back, {}!", session.user.name);
                self.session = Some(session);
                self.say(&greeting).await
            }
            Err(CatalogError::NotFound { .. }) => self.say("Error: user not found").await,
            Err(e) => self.report(&e).await,
        }
    }

    async fn register(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("--- Register ---").await?;

        let Some(request) = self.read_new_user().await? else {
            return Ok(());
        };

        match self.catalog.register(request) {
            Ok(user) => {
                self.say(&format!("Registration complete. Your user id is {}.", user.id))
                    .await?;
                self.say(&format!(
                    "Your account is on the {} plan. Contact an administrator for premium access.",
                    user.plan
                ))
                .await
            }
            Err(e) => self.report(&e).await,
        }
    }

    async fn add_user(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("--- Add user ---").await?;

        let Some(request) = self.read_new_user().await? else {
            return Ok(());
        };
        let Some(admin) = self.read_line("Administrator? (y/n): ").await? else {
            return Ok(());
        };

        let result = if admin.eq_ignore_ascii_case("y") {
            self.catalog.add_admin(request)
        } else {
            self.catalog.register(request)
        };
        match result {
            Ok(user) => {
                let role = if user.is_admin { "administrator" } else { "member" };
                self.say(&format!("Added {} {} with id {}.", role, user.email, user.id))
                    .await
            }
            Err(e) => self.report(&e).await,
        }
    }

    /// Collect the registration form.
    ///
    /// Input the shell itself cannot parse is reported here and yields
    /// `None`, as does an interrupted read.
    async fn read_new_user(&mut self) -> Result<Option<NewUser>> {
        let Some(name) = self.read_line("Full name: ").await? else {
            return Ok(None);
        };
        let Some(age) = self.read_line("Age: ").await? else {
            return Ok(None);
        };
        let Ok(age) = age.parse::<u32>() else {
            self.say("Error: age must be a whole number").await?;
            return Ok(None);
        };
        let Some(email) = self.read_line("Email: ").await? else {
            return Ok(None);
        };

        let policy = self.catalog.account_policy().clone();
        let prompt = format!(
            "Password ({}-{} characters): ",
            policy.min_password_len, policy.max_password_len
        );
        let Some(password) = self.read_line(&prompt).await? else {
            return Ok(None);
        };

        self.say("Age classification:").await?;
        let rows: Vec<String> = self
            .catalog
            .classifications()
            .numbered()
            .map(|(n, label)| format!("{}. {} - {}", n, label.name, label.description))
            .collect();
        let count = rows.len();
        for row in rows {
            self.say(&row).await?;
        }

        let Some(selection) = self
            .read_line(&format!("Select your classification (1-{}): ", count))
            .await?
        else {
            return Ok(None);
        };
        match self.pick_classification(&selection) {
            Ok(age_rating) => Ok(Some(NewUser::new(name, email, password, age, age_rating))),
            Err(e) => {
                self.report(&e).await?;
                Ok(None)
            }
        }
    }

    async fn profile(&mut self) -> Result<()> {
        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        // Re-read so admin changes (plan) show up
        let user = self.catalog.user(session.user.id).unwrap_or(session.user);
        let classification = self
            .catalog
            .classifications()
            .lookup(user.age_rating)
            .map(|label| label.name)
            .unwrap_or("unknown");

        self.say("").await?;
        self.say("--- My profile ---").await?;
        self.say(&format!("  Name:           {}", user.name)).await?;
        self.say(&format!("  Email:          {}", user.email)).await?;
        self.say(&format!("  Age:            {}", user.age)).await?;
        self.say(&format!("  Classification: {}", classification)).await?;
        self.say(&format!("  Plan:           {}", user.plan)).await?;
        let admin = if user.is_admin { "yes" } else { "no" };
        self.say(&format!("  Administrator:  {}", admin)).await?;
        let since = user.created_at.format("%Y-%m-%d %H:%M");
        self.say(&format!("  Member since:   {}", since)).await?;
        let started = session.started_at.format("%H:%M:%S");
        self.say(&format!("  Session:        {} (since {})", session.id, started))
            .await
    }

    async fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            info!(user_id = %session.user.id, session = %session.id, "Session ended");
            self.say(&format!("Logged out. See you soon, {}.", session.user.name))
                .await?;
        }
        Ok(())
    }

    async fn list_users(&mut self) -> Result<()> {
        let users = self.catalog.users();
        self.say("").await?;
        self.say(&format!(
            "{:<5} {:<20} {:<28} {:>4} {:<8} {:<5}",
            "ID", "NAME", "EMAIL", "AGE", "PLAN", "ADMIN"
        ))
        .await?;
        self.say(&"-".repeat(75)).await?;
        for user in users {
            self.say(&format!(
                "{:<5} {:<20} {:<28} {:>4} {:<8} {:<5}",
                user.id,
                truncate(&user.name, 20),
                truncate(&user.email, 28),
                user.age,
                user.plan.to_string(),
                if user.is_admin { "yes" } else { "no" }
            ))
            .await?;
        }
        Ok(())
    }

    async fn change_plan(&mut self) -> Result<()> {
        let Some(id) = self.read_line("User id: ").await? else {
            return Ok(());
        };
        let Ok(id) = id.parse::<u64>() else {
            return self.say("Error: user id must be a number").await;
        };
        let Some(plan) = self.read_line("Plan (free/premium): ").await? else {
            return Ok(());
        };

        let result = plan
            .parse::<Plan>()
            .and_then(|plan| self.catalog.set_plan(UserId(id), plan));
        match result {
            Ok(user) => {
                self.say(&format!("{} is now on the {} plan.", user.name, user.plan))
                    .await
            }
            Err(e) => self.report(&e).await,
        }
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    async fn browse(&mut self) -> Result<()> {
        let viewer = self.viewer();
        let items: Vec<ContentItem> = self.catalog.list_visible(viewer.as_ref()).collect();
        self.print_listing(&items).await
    }

    async fn view_item(&mut self) -> Result<()> {
        let Some(id) = self.read_content_id().await? else {
            return Ok(());
        };

        let viewer = self.viewer();
        match self.catalog.view_as(viewer.as_ref(), id) {
            Ok(item) => self.print_details(&item, viewer.as_ref()).await,
            Err(e) => self.report(&e).await,
        }
    }

    async fn rate_item(&mut self) -> Result<()> {
        let Some(viewer) = self.viewer() else {
            return self.say("Log in to rate content.").await;
        };
        let Some(id) = self.read_content_id().await? else {
            return Ok(());
        };

        let item = match self.catalog.view_as(Some(&viewer), id) {
            Ok(item) => item,
            Err(e) => return self.report(&e).await,
        };
        self.say(&format!("Rating '{}'", item.title)).await?;

        let Some(raw) = self
            .read_line("Score (1.0 to 10.0, e.g. 7.5 or 7,5): ")
            .await?
        else {
            return Ok(());
        };

        match self.catalog.rate_as(&viewer, id, &raw) {
            Ok(receipt) => {
                self.say(&format!("Rated: {}", receipt)).await?;
                if let Some(previous) = receipt.previous {
                    self.say(&format!("Replaced your earlier score of {:.2}.", previous))
                        .await?;
                }
                self.say(&format!(
                    "New average: {:.2} ({} ratings)",
                    receipt.average, receipt.rating_count
                ))
                .await
            }
            Err(e) => self.report(&e).await,
        }
    }

    async fn add_content(&mut self) -> Result<()> {
        self.say("").await?;
        self.say("--- Add content ---").await?;

        let Some(title) = self.read_line("Title: ").await? else {
            return Ok(());
        };

        for (i, kind) in ContentKind::ALL.iter().enumerate() {
            self.say(&format!("{}. {} ({})", i + 1, kind, kind.medium())).await?;
        }
        let Some(kind) = self
            .read_line(&format!("Kind (1-{}): ", ContentKind::ALL.len()))
            .await?
        else {
            return Ok(());
        };
        let Some(kind) = kind
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| ContentKind::ALL.get(i).copied())
        else {
            return self.say("Error: invalid kind selection").await;
        };

        let Some(duration) = self.read_line("Duration (minutes): ").await? else {
            return Ok(());
        };
        let Ok(duration) = duration.parse::<u32>() else {
            return self.say("Error: duration must be a whole number").await;
        };

        let rows: Vec<String> = self
            .catalog
            .classifications()
            .numbered()
            .map(|(n, label)| format!("{}. {} (min age {})", n, label.name, label.min_age))
            .collect();
        let count = rows.len();
        for row in rows {
            self.say(&row).await?;
        }
        let Some(selection) = self
            .read_line(&format!("Classification (1-{}): ", count))
            .await?
        else {
            return Ok(());
        };
        let classification = match self.pick_classification(&selection) {
            Ok(rating) => rating,
            Err(e) => return self.report(&e).await,
        };

        let mut request = NewContent::new(title, kind, duration, classification);

        let Some(genre) = self.read_line("Genre (optional): ").await? else {
            return Ok(());
        };
        if !genre.is_empty() {
            request = request.with_genre(genre);
        }
        let Some(description) = self.read_line("Description (optional): ").await? else {
            return Ok(());
        };
        if !description.is_empty() {
            request = request.with_description(description);
        }
        let Some(year) = self.read_line("Release year (optional): ").await? else {
            return Ok(());
        };
        if !year.is_empty() {
            let Ok(year) = year.parse::<u16>() else {
                return self.say("Error: release year must be a number").await;
            };
            request = request.with_release_year(year);
        }

        match self.catalog.add_content(request) {
            Ok(id) => self.say(&format!("Content added with id {}.", id)).await,
            Err(e) => self.report(&e).await,
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    async fn print_listing(&mut self, items: &[ContentItem]) -> Result<()> {
        self.say("").await?;
        if items.is_empty() {
            return self.say("No content available.").await;
        }

        self.say(&format!(
            "{:<5} {:<30} {:<12} {:<14} {:>5} {:<10} {:>6}",
            "ID", "TITLE", "KIND", "GENRE", "MINS", "RATING", "AVG"
        ))
        .await?;
        self.say(&"-".repeat(88)).await?;

        for item in items {
            let listing = item.listing();
            self.say(&format!(
                "{:<5} {:<30} {:<12} {:<14} {:>5} {:<10} {:>6.2}",
                listing.id.to_string(),
                truncate(&listing.title, 30),
                listing.kind.to_string(),
                truncate(listing.genre.as_deref().unwrap_or("-"), 14),
                listing.duration_minutes,
                listing.classification.code(),
                listing.average_rating
            ))
            .await?;
        }

        self.say(&format!("\nTotal: {} items", items.len())).await
    }

    async fn print_details(&mut self, item: &ContentItem, viewer: Option<&Viewer>) -> Result<()> {
        let classification = self
            .catalog
            .classifications()
            .lookup(item.classification)
            .map(|label| format!("{} ({}+)", label.name, label.min_age))
            .unwrap_or_else(|_| item.classification.to_string());

        self.say("").await?;
        self.say(&format!("  ID:             {}", item.id)).await?;
        self.say(&format!("  Title:          {}", item.title)).await?;
        self.say(&format!("  Kind:           {} ({})", item.kind, item.medium()))
            .await?;
        if let Some(genre) = &item.genre {
            self.say(&format!("  Genre:          {}", genre)).await?;
        }
        if let Some(year) = item.release_year {
            self.say(&format!("  Released:       {}", year)).await?;
        }
        self.say(&format!("  Duration:       {} min", item.duration_minutes))
            .await?;
        self.say(&format!("  Classification: {}", classification)).await?;
        self.say(&format!(
            "  Average rating: {:.2} ({} ratings)",
            item.average_rating(),
            item.rating_count()
        ))
        .await?;
        if let Some(score) = viewer.and_then(|v| item.ratings.score_of(v.user_id)) {
            self.say(&format!("  Your rating:    {:.2}", score)).await?;
        }
        if let Some(description) = &item.description {
            self.say(&format!("  {}", description)).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // I/O helpers
    // ------------------------------------------------------------------

    fn viewer(&self) -> Option<Viewer> {
        self.session.as_ref().map(Session::viewer)
    }

    fn pick_classification(&self, selection: &str) -> Result<AgeRating, CatalogError> {
        let index = selection
            .parse::<usize>()
            .map_err(|_| CatalogError::validation("invalid classification selection"))?;
        self.catalog
            .classifications()
            .by_menu_index(index)
            .map(|label| label.rating)
    }

    fn is_admin(&self) -> bool {
        self.session.as_ref().map(|s| s.user.is_admin).unwrap_or(false)
    }

    async fn read_content_id(&mut self) -> Result<Option<ContentId>> {
        let Some(raw) = self.read_line("Content id: ").await? else {
            return Ok(None);
        };
        match raw.parse::<ContentId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.report(&e).await?;
                Ok(None)
            }
        }
    }

    /// Prompt and read one trimmed line.
    ///
    /// `None` means the current flow must unwind; the reason is left in
    /// `self.pending` for the main loop.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.pending.is_some() {
            return Ok(None);
        }

        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let remaining = self.session.as_ref().map(|session| {
            self.session_timeout
                .saturating_sub(session.last_activity.elapsed())
        });

        let read = self.input.read_until(b'\n', &mut self.line_buf);
        match remaining {
            Some(remaining) => match tokio::time::timeout(remaining, read).await {
                Ok(read) => read?,
                Err(_) => {
                    self.pending = Some(Interrupt::Expired);
                    return Ok(None);
                }
            },
            None => read.await?,
        };

        if self.line_buf.is_empty() {
            self.pending = Some(Interrupt::Eof);
            return Ok(None);
        }

        // Undecodable bytes become U+FFFD and fall through as an invalid answer
        let raw = std::mem::take(&mut self.line_buf);
        let line = String::from_utf8_lossy(&raw).trim().to_string();

        if let Some(session) = self.session.as_mut() {
            session.last_activity = Instant::now();
        }
        Ok(Some(line))
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        Ok(())
    }

    async fn report(&mut self, error: &CatalogError) -> Result<()> {
        self.say(&format!("Error: {}", error)).await
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
