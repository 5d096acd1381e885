//! `tiller access`

use std::{
    io::{self, Write},
    path::Path,
};

use clap::Args;
use tabled::{builder::Builder, settings::Style};
use tiller::{
    access::routes::{Navigation, Route, resolve},
    fixtures::Fixture,
};

/// Arguments for `tiller access`
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// User handle from the users fixture; omit to check as a signed-out visitor
    #[arg(long)]
    pub user: Option<String>,

    /// Fixture set providing users
    #[arg(long, default_value = "default")]
    pub set: String,

    /// Paths to resolve, every protected route when omitted
    pub paths: Vec<String>,
}

/// Resolve each path for the user and print the outcome.
///
/// # Errors
///
/// Returns an error if the users cannot be loaded or the user handle is unknown.
pub fn run(fixtures: &Path, args: &AccessArgs) -> anyhow::Result<()> {
    let mut fixture = Fixture::with_base_path(fixtures);

    fixture.load_users(&args.set)?;

    let user = args
        .user
        .as_deref()
        .map(|handle| fixture.user(handle))
        .transpose()?;

    let paths: Vec<String> = if args.paths.is_empty() {
        Route::ALL.iter().map(|route| route.path().to_string()).collect()
    } else {
        args.paths.clone()
    };

    let mut builder = Builder::default();

    builder.push_record(["Path", "Outcome", "Detail"]);

    for path in &paths {
        let (outcome, detail) = match resolve(path, user) {
            Navigation::Render(route) => (format!("render {route}"), String::new()),
            Navigation::Redirect(target) => (format!("redirect {target}"), String::new()),
            Navigation::Denied(_, denial) => {
                let notice = denial.notice();

                (
                    notice.title.to_string(),
                    format!("{}\n{}", notice.description, notice.details),
                )
            }
        };

        builder.push_record([path.clone(), outcome, detail]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());

    writeln!(io::stdout().lock(), "{table}")?;

    Ok(())
}
