//! Startup data: the configured administrator and the optional demo catalog.

use tracing::info;

use crate::config::ResolvedConfig;
use crate::core::Catalog;
use crate::domain::{AgeRating, CatalogResult, NewUser};
use crate::library::{ContentKind, NewContent};

pub const DEMO_ADMIN_EMAIL: &str = "admin@demo.local";
pub const DEMO_ADMIN_PASSWORD: &str = "demo-admin";
const DEMO_RATER_PASSWORD: &str = "demo-rater";

/// Create the configured admin and, when asked, the demo data.
///
/// Returns lines worth showing the operator on startup.
pub fn bootstrap(
    catalog: &Catalog,
    config: &ResolvedConfig,
    demo: bool,
) -> CatalogResult<Vec<String>> {
    let mut notes = Vec::new();

    if let Some(seed) = &config.admin {
        let admin = catalog.add_admin(seed.to_request())?;
        notes.push(format!("Administrator account: {}", admin.email));
    }

    if demo || config.seed_demo {
        let count = seed_demo_catalog(catalog)?;
        notes.push(format!("Loaded {} demo titles.", count));

        if catalog.find_user_by_email(DEMO_ADMIN_EMAIL).is_err() {
            catalog.add_admin(NewUser::new(
                "Demo Admin",
                DEMO_ADMIN_EMAIL,
                DEMO_ADMIN_PASSWORD,
                30,
                AgeRating::Adult,
            ))?;
            notes.push(format!(
                "Demo administrator: {} / {}",
                DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD
            ));
        }
    }

    Ok(notes)
}

/// Add a handful of titles across every kind, rated by three demo accounts
pub fn seed_demo_catalog(catalog: &Catalog) -> CatalogResult<usize> {
    let titles = [
        NewContent::new("The Long Voyage", ContentKind::Movie, 128, AgeRating::Teen)
            .with_genre("Adventure")
            .with_release_year(2019),
        NewContent::new("Night Shift", ContentKind::Series, 52, AgeRating::Adult)
            .with_genre("Crime")
            .with_description("Detectives working the graveyard shift."),
        NewContent::new("Coral Cities", ContentKind::Documentary, 95, AgeRating::General)
            .with_genre("Nature"),
        NewContent::new("Morning Ragas", ContentKind::Music, 7, AgeRating::General)
            .with_genre("Classical"),
        NewContent::new("Build Log", ContentKind::Podcast, 41, AgeRating::General)
            .with_genre("Technology"),
        NewContent::new("The Quiet Orchard", ContentKind::Audiobook, 610, AgeRating::Teen)
            .with_genre("Literary fiction"),
        NewContent::new("Red Ledger", ContentKind::Movie, 117, AgeRating::Adult)
            .with_genre("Thriller")
            .with_release_year(2022),
    ];

    let mut ids = Vec::with_capacity(titles.len());
    for request in titles {
        ids.push(catalog.add_content(request)?);
    }

    let mut raters = Vec::with_capacity(3);
    for n in 1..=3 {
        let rater = catalog.register(NewUser::new(
            format!("Demo Rater {}", n),
            format!("rater{}@demo.local", n),
            DEMO_RATER_PASSWORD,
            30,
            AgeRating::Adult,
        ))?;
        raters.push(rater.id);
    }

    let scores = [["8.5", "7", "9"], ["6,5", "8", "7.5"], ["9.5", "9", "10"]];
    for (id, row) in ids.iter().zip(scores.iter()) {
        for (user, score) in raters.iter().zip(row.iter()) {
            catalog.rate(*id, *user, score)?;
        }
    }

    info!(count = ids.len(), "Demo catalog loaded");
    Ok(ids.len())
}
