use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_client::{
    config::Config,
    forms::{LoginForm, RegisterForm},
    models::{MoviesQuery, TicketStatus},
    services::{
        booking::{PageState, PurchaseOutcome, SeatAction},
        purchase::{complete_purchase, order_id_from_return_url, PaymentResult},
        ticket_edit::TicketEditState,
    },
    views::{legend, MovieCard},
    AppContext,
};

const USAGE: &str = "\
usage: cinema <command> [args]

  movies [search] [page]                 list movies
  movie <slug> [session_id]              movie details, sessions and seat map
  buy <slug> <session_id> <seat_id>      create a payment for a seat
  payment-status <order_id|return_url>   check a payment after returning from the provider
  register <username> <email> <password>
  activate <token>
  login <email> <password>
  logout
  whoami
  tickets                                my tickets
  edit-ticket <session_id> <seat_id> <price> <status> [--confirm]
  add-movie <slug> <title> <description> <duration> <release_date> <poster>
  edit-movie <slug> <new_slug> <title> <description> <duration> <release_date> [poster]
  delete-movie <slug>
  add-session <movie_id> <room_id> <start_time> <price>
  delete-session <movie_id> <session_id>
  add-room <name> <capacity> [rows]
";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting {} ({})", config.app.name, config.app.environment);
    debug!("API at {}", config.api.base_url);

    let ctx = AppContext::new(config).context("failed to build API client")?;
    ctx.start().await.context("failed to restore session")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&ctx, &args).await;

    for toast in ctx.toasts.drain() {
        eprintln!("[{:?}] {}", toast.level, toast.message);
    }
    result
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{}>\n\n{}", name, USAGE))
}

fn num<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg(args, index, name)?
        .parse()
        .with_context(|| format!("<{}> must be a number", name))
}

async fn run(ctx: &AppContext, args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        print!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "movies" => list_movies(ctx, rest).await,
        "movie" => show_movie(ctx, rest).await,
        "buy" => buy(ctx, rest).await,
        "payment-status" => {
            let raw = arg(rest, 0, "order_id")?;
            let order = order_id_from_return_url(raw).context("empty order id")?;
            match complete_purchase(&ctx.api, &ctx.toasts, order).await {
                PaymentResult::Success => println!("Payment confirmed. See `cinema tickets`."),
                PaymentResult::Failed => bail!("payment for order {} was not confirmed", order),
            }
            Ok(())
        }
        "register" => {
            let form = RegisterForm {
                username: arg(rest, 0, "username")?.to_string(),
                email: arg(rest, 1, "email")?.to_string(),
                password: arg(rest, 2, "password")?.to_string(),
            };
            ctx.account().register(&form).await?;
            Ok(())
        }
        "activate" => {
            ctx.account().activate(arg(rest, 0, "token")?).await?;
            Ok(())
        }
        "login" => {
            let form = LoginForm {
                email: arg(rest, 0, "email")?.to_string(),
                password: arg(rest, 1, "password")?.to_string(),
            };
            ctx.account().login(&form).await?;
            Ok(())
        }
        "logout" => {
            ctx.account().logout();
            Ok(())
        }
        "whoami" => {
            match ctx.api.auth().current_user() {
                Some(user) => println!("{} <{}> role: {}", user.username, user.email, user.role.name),
                None => println!("not logged in"),
            }
            Ok(())
        }
        "tickets" => {
            let rows = ctx.account().my_tickets().await?;
            if rows.is_empty() {
                println!("You have no tickets yet.");
            }
            for row in rows {
                println!("{}", row.render());
            }
            Ok(())
        }
        "edit-ticket" => edit_ticket(ctx, rest).await,
        #[cfg(feature = "admin")]
        other => admin::run(ctx, other, rest).await,
        #[cfg(not(feature = "admin"))]
        other => bail!("unknown command {}\n\n{}", other, USAGE),
    }
}

async fn list_movies(ctx: &AppContext, args: &[String]) -> Result<()> {
    let page: u32 = match args.get(1) {
        Some(raw) => raw.parse().context("<page> must be a number")?,
        None => 1,
    };
    let defaults = MoviesQuery::default();
    let query = MoviesQuery {
        offset: page.saturating_sub(1) * defaults.limit,
        search: args.first().cloned(),
        ..defaults
    };
    let movies = ctx.api.list_movies(&query).await?;
    if movies.is_empty() {
        println!("No movies found.");
    }
    for movie in &movies {
        println!("{}", MovieCard::from_movie(movie).render_line());
    }
    Ok(())
}

async fn show_movie(ctx: &AppContext, args: &[String]) -> Result<()> {
    let slug = arg(args, 0, "slug")?;
    let mut page = ctx.movie_page(slug);
    match page.load().await {
        PageState::Ready => {}
        PageState::NotFound => bail!("movie {} not found", slug),
        PageState::Error(message) => bail!("failed to load movie: {}", message),
        PageState::Loading => bail!("movie is still loading"),
    }
    if let Some(session_id) = args.get(1) {
        let session_id = session_id.parse().context("<session_id> must be a number")?;
        page.select_session(session_id).await?;
    }

    if let Some(movie) = page.movie() {
        let card = MovieCard::from_movie(movie);
        println!("{}\n{} | {}\n\n{}\n", card.title, card.release, card.duration, movie.description);
    }
    println!("Sessions:\n{}\n", page.session_options().render(page.booking().session_id()));
    match page.seat_map() {
        Some(map) => {
            print!("{}", map.render());
            let legend: Vec<String> = legend().iter().map(|(s, l)| format!("{} {}", s, l)).collect();
            println!("\n{}", legend.join("   "));
        }
        None => println!("Choose a session to see seats."),
    }
    Ok(())
}

async fn buy(ctx: &AppContext, args: &[String]) -> Result<()> {
    let slug = arg(args, 0, "slug")?;
    let session_id: i64 = num(args, 1, "session_id")?;
    let seat_id: i64 = num(args, 2, "seat_id")?;

    let mut page = ctx.movie_page(slug);
    if *page.load().await != PageState::Ready {
        bail!("movie {} is not available", slug);
    }
    page.select_session(session_id).await?;
    match page.select_seat(seat_id)? {
        SeatAction::Selected { .. } => {}
        SeatAction::EditTicket { .. } => {
            bail!("seat {} is taken; use `cinema edit-ticket {} {}`", seat_id, session_id, seat_id)
        }
    }
    match page.purchase().await? {
        PurchaseOutcome::Redirect { payment_url } => {
            println!("Open this page to pay:\n{}", payment_url);
            Ok(())
        }
        PurchaseOutcome::LoginRequired => bail!("log in to buy tickets (`cinema login`)"),
        PurchaseOutcome::Failed { reason } => bail!("purchase failed: {}", reason),
    }
}

async fn edit_ticket(ctx: &AppContext, args: &[String]) -> Result<()> {
    let session_id: i64 = num(args, 0, "session_id")?;
    let seat_id: i64 = num(args, 1, "seat_id")?;
    let price: f64 = num(args, 2, "price")?;
    let status = TicketStatus::parse(arg(args, 3, "status")?).context("unknown ticket status")?;
    let confirmed = args.iter().any(|a| a == "--confirm");

    let mut editor = ctx.ticket_editor(session_id, seat_id);
    editor.load().await?;
    editor.set_price(price)?;
    editor.set_status(status)?;
    editor.submit().await?;

    if let TicketEditState::ConfirmDelete { ticket, .. } = editor.state() {
        if !confirmed {
            let ticket_id = ticket.id;
            editor.cancel_delete()?;
            bail!(
                "status {} frees the seat and deletes ticket {}; re-run with --confirm",
                status,
                ticket_id
            );
        }
        editor.confirm_delete().await?;
    }
    println!("Ticket editor finished: {}", editor.state().name());
    Ok(())
}

#[cfg(feature = "admin")]
mod admin {
    use anyhow::{bail, Context, Result};
    use std::path::PathBuf;

    use super::{arg, num, USAGE};
    use cinema_client::{
        forms::{MovieForm, RoomForm, SessionForm},
        services::admin::MovieEditOutcome,
        AppContext,
    };

    fn movie_form(args: &[String], poster: Option<PathBuf>) -> Result<MovieForm> {
        Ok(MovieForm {
            slug: arg(args, 0, "slug")?.to_string(),
            title: arg(args, 1, "title")?.to_string(),
            description: arg(args, 2, "description")?.to_string(),
            duration: num(args, 3, "duration")?,
            release_date: arg(args, 4, "release_date")?.to_string(),
            poster,
        })
    }

    pub async fn run(ctx: &AppContext, command: &str, args: &[String]) -> Result<()> {
        let admin = ctx.admin();
        match command {
            "add-movie" => {
                let poster = PathBuf::from(arg(args, 5, "poster")?);
                admin.add_movie(&movie_form(args, Some(poster))?).await?;
            }
            "edit-movie" => {
                let slug = arg(args, 0, "slug")?;
                let movie = ctx
                    .api
                    .movie(slug)
                    .await?
                    .with_context(|| format!("movie {} not found", slug))?;
                let form = movie_form(&args[1..], args.get(6).map(PathBuf::from))?;
                match admin.edit_movie(&movie, &form).await? {
                    MovieEditOutcome::Navigate { slug } => println!("Movie moved to {}", slug),
                    MovieEditOutcome::Refreshed(_) => println!("Movie updated"),
                }
            }
            "delete-movie" => {
                let slug = arg(args, 0, "slug")?;
                let movie = ctx
                    .api
                    .movie(slug)
                    .await?
                    .with_context(|| format!("movie {} not found", slug))?;
                admin.delete_movie(&movie).await?;
            }
            "add-session" => {
                let options = admin.session_form_options().await?;
                let form = SessionForm {
                    movie_id: num(args, 0, "movie_id")?,
                    room_id: num(args, 1, "room_id")?,
                    start_time: arg(args, 2, "start_time")?.to_string(),
                    price: num(args, 3, "price")?,
                };
                if !options.rooms.iter().any(|r| r.id == form.room_id) {
                    bail!("room {} does not exist", form.room_id);
                }
                admin.add_session(&form).await?;
            }
            "delete-session" => {
                admin
                    .delete_session(num(args, 0, "movie_id")?, num(args, 1, "session_id")?)
                    .await?;
            }
            "add-room" => {
                let rows: Option<i64> = match args.get(2) {
                    Some(raw) => Some(raw.parse().context("<rows> must be a number")?),
                    None => None,
                };
                let form = RoomForm {
                    name: arg(args, 0, "name")?.to_string(),
                    capacity: num(args, 1, "capacity")?,
                    auto_fill: rows.is_some(),
                    rows,
                };
                admin.add_room(&form).await?;
            }
            other => bail!("unknown command {}\n\n{}", other, USAGE),
        }
        Ok(())
    }
}
