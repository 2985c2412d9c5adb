use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use storage::repository::Storage;
use study_core::model::{
    Folder, FolderId, StudySet, StudySetId, Term, TermId, User, UserId, Username, Visibility,
};

/// Seed a SQLite database with a demo learner, study sets, a folder and progress.
#[derive(Parser, Debug, Clone)]
#[command(name = "seed")]
struct Args {
    /// SQLite database URL
    #[arg(long = "db", env = "DATABASE_URL", default_value = "sqlite://dev.sqlite3")]
    db_url: String,

    /// Owner of the seeded content
    #[arg(long, env = "USER_ID", default_value_t = 1)]
    user_id: u64,

    /// Owner username
    #[arg(long, env = "SEED_USERNAME", default_value = "demo")]
    username: String,

    /// Number of study sets to upsert
    #[arg(long, default_value_t = 2)]
    sets: u32,

    /// Completed rounds per set
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Fixed current time (RFC 3339) for deterministic seeding
    #[arg(long, value_parser = parse_rfc3339)]
    now: Option<DateTime<Utc>>,
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|t| t.with_timezone(&Utc))
}

const SAMPLES: [(&str, &str); 5] = [
    ("Hallo", "Hello"),
    ("Danke", "Thank you"),
    ("Bitte", "Please / You are welcome"),
    ("Tschuss", "Bye"),
    ("Guten Morgen", "Good morning"),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.db_url.trim().is_empty() {
        return Err("invalid --db value: empty".into());
    }
    let user_id = UserId::new(args.user_id);

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    storage
        .users
        .upsert_user(&User {
            id: user_id,
            username: Username::new(args.username.clone())?,
            name: Some("Demo Learner".into()),
            image: None,
            verified: false,
            last_seen_at: now,
        })
        .await?;

    let folder = Folder::new(FolderId::new(1), user_id, "German basics", now)?;
    storage.folders.upsert_folder(&folder).await?;
    storage
        .experiences
        .record_folder_visit(user_id, folder.id, now)
        .await?;

    for s in 1..=u64::from(args.sets) {
        let set_id = StudySetId::new(s);
        let mut terms = Vec::with_capacity(SAMPLES.len());
        for (rank, (word, definition)) in (0u32..).zip(SAMPLES) {
            terms.push(Term::new(
                TermId::new(s * 100 + u64::from(rank) + 1),
                set_id,
                word,
                definition,
                rank,
            )?);
        }
        let visibility = if s % 2 == 0 {
            Visibility::Private
        } else {
            Visibility::Public
        };
        let set = StudySet::new(
            set_id,
            user_id,
            format!("German {s}"),
            "Everyday phrases",
            now - Duration::days(i64::try_from(s)?),
            visibility,
            terms,
        )?;
        storage.study_sets.upsert_study_set(&set).await?;
        storage.folders.add_study_set(folder.id, set.id).await?;

        if let Some(first) = set.terms.first() {
            storage
                .study_sets
                .set_starred(user_id, first.id, true)
                .await?;
        }
        for term in &set.terms {
            storage
                .experiences
                .record_studiable_term(user_id, term.id, 1)
                .await?;
        }
        for _ in 0..args.rounds {
            storage
                .experiences
                .complete_round(user_id, set.id, now)
                .await?;
        }
    }

    println!(
        "Seeded user @{} with {} study sets ({} rounds each) into {}",
        args.username, args.sets, args.rounds, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
