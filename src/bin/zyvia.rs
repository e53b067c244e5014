use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use zyvia::config::ClientOptions;
use zyvia::forms::{GenerateOutfitForm, LoginForm, RegisterForm, SubmissionState, UploadForm};
use zyvia::outfit::{Occasion, Outfit};
use zyvia::task::TaskSlot;
use zyvia::wardrobe::{ClothingItem, ClothingType, ImageFile, Style};
use zyvia::Zyvia;

#[derive(Parser)]
#[clap(name = "zyvia", version, about = "Manage your Zyvia wardrobe from the terminal")]
struct Cli {
    /// Backend base URL
    #[clap(long, env = "ZYVIA_API_URL")]
    api_url: Option<String>,

    /// Session file location
    #[clap(long, env = "ZYVIA_SESSION_PATH")]
    session: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        #[clap(short, long)]
        username: String,
        #[clap(short, long, env = "ZYVIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new account
    Register {
        #[clap(short, long)]
        email: String,
        #[clap(short, long)]
        username: String,
        #[clap(short, long, env = "ZYVIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Forget the stored session if it belongs to USERNAME
    Forget { username: String },
    /// Show who is logged in
    Whoami {
        /// Only look at the local session, do not ask the server
        #[clap(long)]
        local: bool,
    },
    /// List the items in your wardrobe
    Wardrobe {
        /// Only items with this primary color
        #[clap(long)]
        color: Option<String>,
    },
    /// Upload a photograph of a clothing item
    Upload {
        image: PathBuf,
        #[clap(long)]
        name: Option<String>,
        #[clap(long = "type", default_value = "Top")]
        clothing_type: ClothingType,
        #[clap(long, default_value = "casual")]
        style: Style,
    },
    /// Delete an item from your wardrobe
    Delete { id: i64 },
    /// Show the color palette of an item
    Palette { id: i64 },
    /// Show items that look similar to an item
    Similar { id: i64 },
    /// Generate outfits around a base item
    Generate {
        base_item_id: i64,
        #[clap(long, default_value = "casual")]
        occasion: Occasion,
    },
    /// Show today's suggested outfit
    Today,
    /// Show recommended outfits
    Recommend,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut options = ClientOptions::from_env();
    if let Some(url) = &cli.api_url {
        options = options.with_base_url(url);
    }
    if let Some(path) = cli.session {
        options = options.with_session_path(path);
    }
    let zyvia = Zyvia::new_with_options(options).context("failed to create client")?;

    // Ctrl-C returns from main, dropping the slot and aborting the request.
    let mut slot = TaskSlot::new();
    let command = cli.command;
    slot.spawn(async move { run(zyvia, command).await });

    tokio::select! {
        result = slot.join() => match result {
            Some(Ok(result)) => result,
            Some(Err(err)) => Err(anyhow!("command aborted: {}", err)),
            None => Ok(()),
        },
        _ = tokio::signal::ctrl_c() => Err(anyhow!("cancelled")),
    }
}

async fn run(zyvia: Zyvia, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let mut form = LoginForm::new(&username, &password);
            report(form.submit(&zyvia).await)
        }
        Command::Register {
            email,
            username,
            password,
        } => {
            let mut form = RegisterForm::new(&email, &username, &password);
            report(form.submit(&zyvia).await)
        }
        Command::Logout => {
            zyvia.auth().sign_out().await;
            println!("Logged out.");
            Ok(())
        }
        Command::Forget { username } => {
            if zyvia.session().forget(&username).await {
                println!("Forgot {}.", username);
            } else {
                println!("No stored session for {}.", username);
            }
            Ok(())
        }
        Command::Whoami { local } => {
            let session = zyvia
                .session()
                .current()
                .await
                .ok_or_else(|| anyhow!("Not logged in."))?;

            if local {
                println!("{}", session.username);
                return Ok(());
            }

            let profile = zyvia.auth().profile().await?;
            match profile.email {
                Some(email) if !email.is_empty() => {
                    println!("{} <{}> (id {})", profile.username, email, profile.id)
                }
                _ => println!("{} (id {})", profile.username, profile.id),
            }
            Ok(())
        }
        Command::Wardrobe { color: Some(color) } => {
            let items = zyvia.wardrobe().list_filtered(Some(&color)).await?;
            print_items(&zyvia, &items);
            Ok(())
        }
        Command::Wardrobe { color: None } => {
            let wardrobe = zyvia.wardrobe_resource();
            if !wardrobe.refetch().await {
                bail!("You must be logged in to view your wardrobe.");
            }

            let state = wardrobe.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            print_items(&zyvia, &state.items);
            Ok(())
        }
        Command::Upload {
            image,
            name,
            clothing_type,
            style,
        } => {
            let mut form = UploadForm::new();
            form.name = name;
            form.clothing_type = clothing_type;
            form.style = style;
            form.set_image(Some(ImageFile::from_path(&image).await?));

            let state = form.submit(&zyvia).await;
            if let Some(item) = &form.created {
                print_items(&zyvia, std::slice::from_ref(item));
            }
            report(state)
        }
        Command::Delete { id } => {
            zyvia.wardrobe().delete(id).await?;
            println!("Deleted item {}.", id);
            Ok(())
        }
        Command::Palette { id } => {
            let palette = zyvia.wardrobe().palette(id).await?;
            println!(
                "#{} primary color: {}",
                palette.id,
                palette.primary_color.as_deref().unwrap_or("unknown")
            );
            for color in palette.color_palette.unwrap_or_default() {
                println!("  {}", color);
            }
            Ok(())
        }
        Command::Similar { id } => {
            let items = zyvia.wardrobe().similar(id).await?;
            if items.is_empty() {
                println!("No similar items found.");
            }
            print_items(&zyvia, &items);
            Ok(())
        }
        Command::Generate {
            base_item_id,
            occasion,
        } => {
            let mut form = GenerateOutfitForm::new(Some(base_item_id), occasion);
            let state = form.submit(&zyvia).await;
            for (index, outfit) in form.outfits.iter().enumerate() {
                print_outfit(&zyvia, index + 1, outfit);
            }
            report(state)
        }
        Command::Today => {
            let outfit = zyvia.outfits().outfit_of_the_day().await?;
            print_outfit(&zyvia, 1, &outfit);
            Ok(())
        }
        Command::Recommend => {
            let recommendations = zyvia.recommendation_resource();
            if !recommendations.refetch().await {
                bail!("You must be logged in to see recommendations.");
            }

            let state = recommendations.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            if state.items.is_empty() {
                println!("No recommendations yet.");
            }
            for (index, outfit) in state.items.iter().enumerate() {
                print_outfit(&zyvia, index + 1, outfit);
            }
            Ok(())
        }
    }
}

fn report(state: SubmissionState) -> anyhow::Result<()> {
    if state.is_error() {
        bail!(state.message);
    }
    println!("{}", state.message);
    Ok(())
}

fn print_items(zyvia: &Zyvia, items: &[ClothingItem]) {
    for item in items {
        let mut line = format!(
            "#{:<5} {:<24} {:<10} {:<9}",
            item.id, item.name, item.clothing_type, item.style
        );
        if let Some(color) = &item.primary_color {
            line.push_str(&format!(" {:<12}", color));
        }
        if let Some(score) = item.similarity_score {
            line.push_str(&format!(" similarity {:.2}", score));
        }
        println!("{} {}", line, zyvia.image_url(item));
    }
}

fn print_outfit(zyvia: &Zyvia, number: usize, outfit: &Outfit) {
    println!("Outfit #{}", number);
    for (slot, item) in outfit.items() {
        println!(
            "  {:<10} #{} {} ({})",
            slot,
            item.id,
            item.name,
            zyvia.image_url(item)
        );
    }
    if let Some(score) = outfit.score {
        match outfit.visual_similarity {
            Some(visual) => println!("  score {:.2} | visual {:.2}", score, visual),
            None => println!("  score {:.2}", score),
        }
    }
    if !outfit.explanation.is_empty() {
        println!("  {}", outfit.explanation);
    }
    if !outfit.tags.is_empty() {
        println!("  tags: {}", outfit.tags.join(", "));
    }
}
