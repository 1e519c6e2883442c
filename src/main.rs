use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use stay_bookings::api::BookingStoreClient;
use stay_bookings::classifier::{
    cancellation_deadline, display_status, is_cancellable_within, nights_between, Bucket,
};
use stay_bookings::config::Config;
use stay_bookings::controller::{BookingCard, BookingListController};
use stay_bookings::error::{CancellationRejected, ControllerError};
use stay_bookings::util::{format_amount, format_duration, format_stay, truncate};

type CliResult = std::result::Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "stay_bookings")]
#[command(about = "View and manage your stays")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BucketArg {
    Upcoming,
    Past,
    Cancelled,
}

impl From<BucketArg> for Bucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Upcoming => Bucket::Upcoming,
            BucketArg::Past => Bucket::Past,
            BucketArg::Cancelled => Bucket::Cancelled,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List bookings in one bucket
    List {
        #[arg(short, long, value_enum, default_value = "upcoming")]
        bucket: BucketArg,
    },
    /// Show one booking in detail
    Show {
        booking_id: u64,
    },
    /// Cancel a booking (must be more than the cancellation window before check-in)
    Cancel {
        booking_id: u64,
        /// Reason passed on to the host
        #[arg(short, long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> CliResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stay_bookings=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let client = BookingStoreClient::new(&config.store)?;
    let controller = BookingListController::new(client)
        .with_cancellation_window(config.policy.cancellation_window());

    controller.load().await?;

    match cli.command {
        Commands::List { bucket } => {
            let now = Utc::now();
            controller.select_bucket(bucket.into());
            let counts = controller.bucket_counts(now);
            let snapshot = controller.snapshot(now);

            println!(
                "\nUpcoming ({})  Past ({})  Cancelled ({})",
                counts.upcoming, counts.past, counts.cancelled
            );

            if snapshot.bookings.is_empty() {
                println!("\nNo {} bookings.", snapshot.bucket.label().to_lowercase());
            } else {
                println!(
                    "\n{:<8} {:<28} {:<34} {:<7} {:<12} {:<16}",
                    "ID", "Property", "Dates", "Nights", "Status", "Total"
                );
                println!("{}", "-".repeat(110));

                for card in &snapshot.bookings {
                    print_row(card);
                }
                println!("\n* free cancellation still available");
            }
        }
        Commands::Show { booking_id } => {
            let now = Utc::now();
            let Some(booking) = controller.find(booking_id) else {
                return Err(format!("Booking {} not found", booking_id).into());
            };

            let window = config.policy.cancellation_window();
            let status = display_status(&booking.status);
            let check_in = booking.check_in.with_timezone(&Local);
            let check_out = booking.check_out.with_timezone(&Local);

            println!("\n{}", booking.property.title);
            println!("{}", booking.property.location());
            println!("Host:    {}", booking.property.host.name);
            println!("Dates:   {}", format_stay(&check_in, &check_out));
            println!("Nights:  {}", nights_between(booking.check_in, booking.check_out));
            println!("Guests:  {}", booking.guests);
            println!("Total:   {}", format_amount(booking.total_amount));
            println!("Status:  {}", status.label);

            if is_cancellable_within(&booking, now, window) {
                let deadline = cancellation_deadline(&booking, window);
                println!(
                    "Free cancellation for another {} (until {})",
                    format_duration(deadline - now),
                    deadline.with_timezone(&Local).format("%a %d %b %H:%M")
                );
            }
        }
        Commands::Cancel { booking_id, reason } => {
            let reason = reason.unwrap_or_else(|| config.policy.default_cancel_reason.clone());
            match controller.cancel(booking_id, &reason, Utc::now()).await {
                Ok(()) => info!("Booking {} cancelled", booking_id),
                Err(ControllerError::CancellationRejected(rejection)) => {
                    match &rejection {
                        CancellationRejected::PolicyViolation { .. } => error!(
                            "Booking {} is inside the {}h window before check-in \
                             and can no longer be cancelled",
                            booking_id, config.policy.cancellation_window_hours
                        ),
                        CancellationRejected::StoreRejected(e) => {
                            error!("The booking service refused to cancel: {}", e)
                        }
                        CancellationRejected::UnknownBooking(_) => {
                            error!("Booking {} not found", booking_id)
                        }
                        CancellationRejected::InFlight(pending) => {
                            error!("Booking {} is already being cancelled", pending)
                        }
                    }
                    return Err(rejection.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn print_row(card: &BookingCard) {
    let booking = &card.booking;
    let check_in = booking.check_in.with_timezone(&Local);
    let check_out = booking.check_out.with_timezone(&Local);
    let status = if card.cancellable {
        format!("{}*", card.status.label)
    } else {
        card.status.label.clone()
    };

    println!(
        "{:<8} {:<28} {:<34} {:<7} {:<12} {:<16}",
        booking.id,
        truncate(&booking.property.title, 26),
        format_stay(&check_in, &check_out),
        card.nights,
        status,
        format_amount(booking.total_amount)
    );
}
