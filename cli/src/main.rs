use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rentals::config::{ConfigError, normalize_base_url};
use rentals::net::types::{Furnishing, ImageUpload, Property, PropertyDraft, PropertyType, TenantPreference};
use rentals::state::listings::{ListingFilter, SortOrder, browse};
use rentals::state::wishlist::Wishlist;
use rentals::validation::{ForgotPasswordForm, LoginForm, OtpForm, ProfileForm, ResetPasswordForm, SignupForm};
use rentals::{
    ApiClient, ApiError, AuthService, AuthStore, AuthStoreError, ClientConfig, FileStorage, PropertyService,
    StorageError,
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] AuthStoreError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "rentals", about = "Rental listings API client")]
struct Cli {
    #[arg(long, env = "RENTALS_API_BASE_URL")]
    base_url: Option<String>,

    /// Session file holding the saved token and user.
    #[arg(long, env = "RENTALS_STORE_PATH")]
    store: Option<PathBuf>,

    /// Log requests to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Property(PropertyCommand),
    Wishlist(WishlistCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "RENTALS_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
    },
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    ResendOtp {
        #[arg(long)]
        email: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RENTALS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Fetch the signed-in user from the server.
    Me,
    /// Show the saved session without touching the network.
    Status,
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long, env = "RENTALS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    UpdateProfile(UpdateProfileArgs),
    Logout,
}

/// Unset flags keep the signed-in user's current values.
#[derive(Args, Debug)]
struct UpdateProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    aadhar: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    pincode: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PropertyCommand {
    #[command(subcommand)]
    command: PropertySubcommand,
}

#[derive(Subcommand, Debug)]
enum PropertySubcommand {
    List(ListArgs),
    Get {
        id: String,
    },
    /// Listings owned by the signed-in user.
    Mine,
    Create(ListingArgs),
    Update {
        id: String,
        #[command(flatten)]
        listing: ListingArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long = "type")]
    property_type: Option<PropertyType>,
    #[arg(long)]
    min_rent: Option<u64>,
    #[arg(long)]
    max_rent: Option<u64>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long, short)]
    query: Option<String>,
    #[arg(long)]
    furnishing: Option<Furnishing>,
    #[arg(long)]
    tenant: Option<TenantPreference>,
    #[arg(long, default_value = "newest")]
    sort: SortOrder,
}

#[derive(Args, Debug)]
struct ListingArgs {
    /// JSON file with the listing fields.
    #[arg(long)]
    data: PathBuf,
    /// Image file to upload; repeatable.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct WishlistCommand {
    #[command(subcommand)]
    command: WishlistSubcommand,
}

#[derive(Subcommand, Debug)]
enum WishlistSubcommand {
    List,
    Toggle { id: String },
}

struct CliContext {
    store: AuthStore<FileStorage>,
    properties: PropertyService,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = normalize_base_url(&base_url);
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    tracing::debug!(base_url = %config.base_url, store = %config.store_path.display(), "configured");

    let api = ApiClient::new(&config)?;
    let mut store = AuthStore::new(AuthService::new(api.clone()), FileStorage::new(config.store_path));
    store.restore();
    let mut ctx = CliContext { store, properties: PropertyService::new(api) };

    match cli.command {
        Command::Auth(auth) => run_auth(&mut ctx, auth.command).await,
        Command::Property(property) => run_property(&mut ctx, property.command).await,
        Command::Wishlist(wishlist) => run_wishlist(&mut ctx, wishlist.command).await,
    }
}

async fn run_auth(ctx: &mut CliContext, command: AuthSubcommand) -> Result<(), CliError> {
    let store = &mut ctx.store;
    match command {
        AuthSubcommand::Signup { first_name, last_name, email, password, confirm_password } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            let form = SignupForm { first_name, last_name, email, password, confirm_password };
            print_json(&store.signup(&form).await?)
        }
        AuthSubcommand::Verify { email, otp } => {
            let user = store.verify_otp(&OtpForm { email, otp }).await?;
            print_json(&user)
        }
        AuthSubcommand::ResendOtp { email } => print_json(&store.resend_otp(&email).await?),
        AuthSubcommand::Login { email, password } => {
            let user = store.login(&LoginForm { email, password }).await?;
            print_json(&user)
        }
        AuthSubcommand::Me => print_json(&store.refresh_user().await?),
        AuthSubcommand::Status => print_json(&json!({
            "authenticated": store.is_authenticated(),
            "user": store.user(),
            "expiresAt": store.state().expires_at,
        })),
        AuthSubcommand::ForgotPassword { email } => {
            print_json(&store.forgot_password(&ForgotPasswordForm { email }).await?)
        }
        AuthSubcommand::ResetPassword { email, otp, password, confirm_password } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            let form = ResetPasswordForm { email, otp, password, confirm_password };
            print_json(&store.reset_password(&form).await?)
        }
        AuthSubcommand::UpdateProfile(args) => {
            let Some(user) = store.user() else {
                return Err(AuthStoreError::NotAuthenticated.into());
            };
            let mut form = ProfileForm::from_user(user);
            apply_profile_args(&mut form, args.first_name, args.last_name, args.phone, args.aadhar);
            let address = &mut form.address;
            for (slot, value) in [
                (&mut address.street, args.street),
                (&mut address.city, args.city),
                (&mut address.state, args.state),
                (&mut address.pincode, args.pincode),
            ] {
                if value.is_some() {
                    *slot = value;
                }
            }
            let image = args.image.as_deref().map(read_image).transpose()?;
            print_json(&store.update_profile(&form, image).await?)
        }
        AuthSubcommand::Logout => {
            store.logout()?;
            print_json(&json!({ "authenticated": false }))
        }
    }
}

fn apply_profile_args(
    form: &mut ProfileForm,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    aadhar: Option<String>,
) {
    if let Some(first_name) = first_name {
        form.first_name = first_name;
    }
    if let Some(last_name) = last_name {
        form.last_name = last_name;
    }
    if phone.is_some() {
        form.phone = phone;
    }
    if aadhar.is_some() {
        form.aadhar = aadhar;
    }
}

async fn run_property(ctx: &mut CliContext, command: PropertySubcommand) -> Result<(), CliError> {
    match command {
        PropertySubcommand::List(args) => {
            let mut all = ctx.properties.list().await?;
            if ctx.store.is_authenticated() {
                mark_favorites(ctx, &mut all).await;
            }
            let filter = ListingFilter {
                property_type: args.property_type,
                min_rent: args.min_rent,
                max_rent: args.max_rent,
                city: args.city,
                query: args.query,
                furnishing: args.furnishing,
                tenant: args.tenant,
            };
            print_json(&browse(&all, &filter, args.sort))
        }
        PropertySubcommand::Get { id } => print_json(&ctx.properties.get(&id).await?),
        PropertySubcommand::Mine => {
            let token = ctx.store.require_token()?;
            let result = ctx.properties.by_owner(&token).await;
            print_json(&signed_in(ctx, result)?)
        }
        PropertySubcommand::Create(listing) => {
            let token = ctx.store.require_token()?;
            let (draft, images) = read_listing(&listing)?;
            let result = ctx.properties.create(&token, &draft, images).await;
            print_json(&signed_in(ctx, result)?)
        }
        PropertySubcommand::Update { id, listing } => {
            let token = ctx.store.require_token()?;
            let (draft, images) = read_listing(&listing)?;
            let result = ctx.properties.update(&token, &id, &draft, images).await;
            print_json(&signed_in(ctx, result)?)
        }
        PropertySubcommand::Delete { id } => {
            let token = ctx.store.require_token()?;
            let result = ctx.properties.delete(&token, &id).await;
            print_json(&signed_in(ctx, result)?)
        }
    }
}

async fn run_wishlist(ctx: &mut CliContext, command: WishlistSubcommand) -> Result<(), CliError> {
    let token = ctx.store.require_token()?;
    let mut wishlist = Wishlist::new();
    match command {
        WishlistSubcommand::List => {
            let result = wishlist.sync(&ctx.properties, &token).await;
            print_json(&signed_in(ctx, result)?)
        }
        WishlistSubcommand::Toggle { id } => {
            let result = wishlist.toggle(&ctx.properties, &token, &id).await;
            let is_favorite = signed_in(ctx, result)?;
            print_json(&json!({ "id": id.trim(), "isFavorite": is_favorite }))
        }
    }
}

async fn mark_favorites(ctx: &mut CliContext, listings: &mut [Property]) {
    let Ok(token) = ctx.store.require_token() else {
        return;
    };
    let mut wishlist = Wishlist::new();
    match wishlist.sync(&ctx.properties, &token).await {
        Ok(_) => wishlist.annotate(listings),
        Err(e) => tracing::warn!(error = %e, "could not load wishlist"),
    }
}

/// Drop the saved session when the server rejects its token.
fn signed_in<T>(ctx: &mut CliContext, result: Result<T, ApiError>) -> Result<T, CliError> {
    match result {
        Err(e) if e.is_unauthorized() => {
            ctx.store.logout()?;
            Err(AuthStoreError::SessionExpired.into())
        }
        other => Ok(other?),
    }
}

fn read_listing(args: &ListingArgs) -> Result<(PropertyDraft, Vec<ImageUpload>), CliError> {
    let raw = read_file(&args.data)?;
    let draft = serde_json::from_slice::<PropertyDraft>(&raw)?;
    let images = args.images.iter().map(|path| read_image(path)).collect::<Result<Vec<_>, _>>()?;
    Ok((draft, images))
}

fn read_image(path: &Path) -> Result<ImageUpload, CliError> {
    Ok(ImageUpload::new(path, read_file(path)?))
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
