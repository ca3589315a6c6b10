mod config;
mod graphql;
mod store;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::graphql::Context;
use crate::store::{DocumentStore, MemoryStore};

const VERSION: &'static str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Deserialize, Serialize)]
#[clap(name = "Movie Catalog API", version = VERSION)]
struct Opts {
    #[clap(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[clap(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    seed_file_path: Option<PathBuf>,
}

#[rocket::get("/graphiql")]
fn graphiql() -> RawHtml<String> {
    juniper_rocket::graphiql_source("/graphql", None)
}

#[rocket::get("/graphql?<request..>")]
fn get_graphql_handler(
    context: &State<Context>,
    request: juniper_rocket::GraphQLRequest,
    schema: &State<graphql::schema::Schema>,
) -> juniper_rocket::GraphQLResponse {
    request.execute_sync(&*schema, &*context)
}

#[rocket::post("/graphql", data = "<request>")]
fn post_graphql_handler(
    context: &State<Context>,
    request: juniper_rocket::GraphQLRequest,
    schema: &State<graphql::schema::Schema>,
) -> juniper_rocket::GraphQLResponse {
    request.execute_sync(&*schema, &*context)
}

#[rocket::get("/")]
fn root_redirect() -> Redirect {
    Redirect::temporary(rocket::uri!("/graphiql"))
}

#[rocket::get("/health")]
fn health() -> Status {
    Status::Accepted
}

fn build_rocket(
    figment: rocket::figment::Figment,
    store: Arc<dyn DocumentStore>,
) -> rocket::Rocket<rocket::Build> {
    rocket::custom(figment)
        .manage(graphql::schema::schema())
        .manage(Context::new(store))
        .mount(
            "/",
            rocket::routes![
                graphiql,
                get_graphql_handler,
                post_graphql_handler,
                root_redirect,
                health
            ],
        )
}

#[rocket::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting tracing default subscriber failed");

    let proj_dirs = directories::ProjectDirs::from("dev", "MovieCatalog", "Movie Catalog")
        .expect("Unable to determine the configuration directory");

    let opts: Opts = Opts::parse();

    let config_file_dir = PathBuf::from(proj_dirs.config_dir());
    let mut config_file = config_file_dir.clone();
    config_file.push("movie-catalog.toml");
    let config_file = config_file;

    // If we don't have an existing config file, just write the defaults to it
    if !config_file.as_path().exists() {
        fs::create_dir_all(&config_file_dir).expect("Unable to create configuration directory");

        let serialized_defaults = toml::to_string(&config::Config::default())
            .expect("Unable to serialize default configuration");
        fs::write(&config_file, serialized_defaults).expect("Unable to write file");
        tracing::info!("Wrote default configuration to {:?}", &config_file)
    }

    let figment = Figment::from(Toml::file(config_file)).merge(Serialized::defaults(opts));

    let config: config::Config = figment
        .extract::<config::Config>()
        .expect("The provided configuration is invalid");

    tracing::info!("Movie Catalog API v{}", VERSION);
    tracing::info!("Using port {:?}", config.port);
    tracing::info!("Using seed file {:?}", config.seed_file_path);

    let store = Arc::new(MemoryStore::new());

    if config.seed_file_path.as_path().exists() {
        let written = store::load_seed(store.as_ref(), &config.seed_file_path)
            .expect("Failed to load the seed file");
        tracing::info!("Seeded {} documents", written);
    } else {
        tracing::warn!(
            "No seed file at {:?}, starting with an empty store",
            config.seed_file_path
        );
    }

    let movies = store.list("movies").expect("Failed to read the movie collection");
    tracing::info!("Movies total: {}", movies.len());

    let rocket_figment = rocket::Config::figment().merge(("port", config.port));

    build_rocket(rocket_figment, store)
        .launch()
        .await
        .expect("Failed to launch the web server");

    tracing::info!("Shutting down the server");
}
