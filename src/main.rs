mod api;
mod camera;
mod config;
mod draft;
mod encoder;
mod model;
mod pipeline;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use api::ApiClient;
use camera::{list_devices, CaptureSession, Facing, Resolution};
use config::Config;
use draft::{DraftForm, DraftRecord};
use model::{Category, InventoryRecord, Location};
use pipeline::{scan_item, ScanError};
use store::InventoryStore;

/// Parse a camera facing preference.
fn parse_facing(s: &str) -> Result<Facing, String> {
    match s.to_lowercase().as_str() {
        "environment" | "rear" => Ok(Facing::Environment),
        "user" | "front" => Ok(Facing::User),
        other => Err(format!(
            "Unknown facing '{}'. Use 'environment' or 'user'",
            other
        )),
    }
}

/// Parse and validate a quantity for new items (must be >= 1).
fn parse_new_quantity(s: &str) -> Result<u32, String> {
    let quantity: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid quantity", s))?;
    if quantity < 1 {
        return Err("Quantity must be at least 1.".to_string());
    }
    Ok(quantity)
}

#[derive(Parser)]
#[command(name = "stockcheck", about = "Inventory tracking for the org workshop")]
struct Cli {
    /// Path to a config file (default: ~/.config/stockcheck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available camera devices
    ListCameras,
    /// Fetch and display the inventory list
    List {
        /// Case-insensitive search over name and category
        #[arg(long)]
        search: Option<String>,
    },
    /// Add an item with manually entered fields
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        category: Category,
        #[arg(long, value_parser = parse_new_quantity, default_value = "1")]
        quantity: u32,
        /// Storage location (known locations: workshop, storage-room, ...)
        #[arg(long)]
        location: String,
        /// Attach an image file to the item
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Capture a photo and add the item via the recognition endpoint
    Scan {
        /// Camera facing preference: environment (rear) or user (front)
        #[arg(long, value_parser = parse_facing, default_value = "environment")]
        facing: Facing,
        /// Storage location for the scanned item (overrides recognition)
        #[arg(long)]
        location: Option<String>,
        /// Submit the recognized draft instead of just printing it
        #[arg(long)]
        submit: bool,
    },
    /// Set the quantity of an item
    SetQuantity {
        id: String,
        /// New quantity; negative values are rejected before any request
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Increase an item's quantity by one
    Inc { id: String },
    /// Decrease an item's quantity by one (no-op at zero)
    Dec { id: String },
}

impl clap::ValueEnum for Category {
    fn value_variants<'a>() -> &'a [Self] {
        &Category::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[tokio::main]
async fn main() {
    // dotenv returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::ListCameras => run_list_cameras(),
        Commands::List { search } => run_list(&config, search.as_deref().unwrap_or("")).await,
        Commands::Add {
            name,
            category,
            quantity,
            location,
            image,
        } => run_add(&config, name, category, quantity, location, image).await,
        Commands::Scan {
            facing,
            location,
            submit,
        } => run_scan(&config, facing, location, submit).await,
        Commands::SetQuantity { id, quantity } => {
            run_mutation(&config, &id, move |store, id| async move {
                store.mutate_quantity_signed(&id, quantity).await.map(Some)
            })
            .await
        }
        Commands::Inc { id } => {
            run_mutation(&config, &id, |store, id| async move {
                store.increment(&id).await.map(Some)
            })
            .await
        }
        Commands::Dec { id } => {
            run_mutation(&config, &id, |store, id| async move { store.decrement(&id).await })
                .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No camera devices found.");
        return Ok(());
    }
    for device in devices {
        println!("{}", device);
    }
    Ok(())
}

async fn run_list(config: &Config, search: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = InventoryStore::new(ApiClient::from_config(config)?);
    store.refresh().await?;

    let records = store.filter(search);
    if records.is_empty() {
        println!("No items found matching your search.");
    } else {
        for record in &records {
            print_record(record);
        }
    }

    let low = store.low_stock_count();
    if low > 0 {
        println!("\n{} items low in stock", low);
    }
    Ok(())
}

fn print_record(record: &InventoryRecord) {
    let marker = if record.is_low_stock() { "  LOW" } else { "" };
    let location = if record.location.is_empty() {
        String::new()
    } else {
        format!(" @ {}", record.location)
    };
    println!(
        "{:<24} [{}] {:>4} in stock{}{}",
        record.name, record.category, record.quantity, location, marker
    );
}

async fn run_add(
    config: &Config,
    name: String,
    category: Category,
    quantity: u32,
    location: String,
    image: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::from_config(config)?;
    let mut form = DraftForm::new();

    {
        let draft = form.draft_mut();
        draft.name = name;
        draft.category = Some(category);
        draft.quantity = quantity;
        draft.location = Location::new(location);
        if let Some(path) = image {
            draft.stage_image_file(&path)?;
        }
    }

    let record = form.submit(&client).await?;
    println!("Saved Successfully");
    print_record(&record);
    Ok(())
}

async fn run_scan(
    config: &Config,
    facing: Facing,
    location: Option<String>,
    submit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::from_config(config)?;
    let mut session = CaptureSession::new(
        config::CameraConfig {
            environment_device: config.camera.environment_device,
            user_device: config.camera.user_device,
        },
        Resolution::default(),
    );
    let mut draft = DraftRecord::default();
    if let Some(location) = &location {
        draft.location = Location::new(location.clone());
    }

    session.start(facing)?;
    println!("Scanning...");

    match scan_item(&mut session, &client, &mut draft).await {
        Ok(response) => {
            println!("Recognized:");
            println!("  name:     {}", draft.name);
            println!(
                "  category: {}",
                draft
                    .category
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("  quantity: {}", draft.quantity);
            println!("  location: {}", draft.location);
            if !response.raw_text.is_empty() {
                println!("  raw text: {}", response.raw_text);
            }
        }
        Err(ScanError::Recognition(e)) => {
            // The captured image stays staged; finish the entry manually
            eprintln!("Error: {}", e);
            eprintln!("Recognition failed. Add the item manually with 'stockcheck add'.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(location) = location {
        draft.location = Location::new(location);
    }

    if submit {
        let mut form = DraftForm::new();
        *form.draft_mut() = draft;
        match form.submit(&client).await {
            Ok(record) => {
                println!("Saved Successfully");
                print_record(&record);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Draft retained. Fix the field and resubmit with 'stockcheck add'.");
                std::process::exit(1);
            }
        }
    } else {
        println!("\nRun again with --submit (and --location) to save this item.");
    }
    Ok(())
}

async fn run_mutation<F, Fut>(
    config: &Config,
    id: &str,
    op: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(InventoryStore, String) -> Fut,
    Fut: std::future::Future<Output = Result<Option<InventoryRecord>, store::StoreError>>,
{
    let store = InventoryStore::new(ApiClient::from_config(config)?);
    store.refresh().await?;

    match op(store, id.to_string()).await? {
        Some(record) => print_record(&record),
        None => println!("Quantity is already 0; nothing to do."),
    }
    Ok(())
}
