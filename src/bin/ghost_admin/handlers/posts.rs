#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use ghost_admin::AdminClient;

use crate::args::PostsCmd;
use crate::error::CliError;
use crate::io::{parse_object, read_value};
use crate::print::print_json;

pub async fn handle(client: &AdminClient, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List => list(client).await,
        PostsCmd::Get { id } => get(client, &id).await,
        PostsCmd::Copy { id } => copy(client, &id).await,
        PostsCmd::Update {
            id,
            data,
            data_file,
        } => update(client, &id, data, data_file).await,
    }
}

async fn list(client: &AdminClient) -> Result<(), CliError> {
    let posts = client.get_posts().await?;
    print_json(&posts)
}

async fn get(client: &AdminClient, id: &str) -> Result<(), CliError> {
    let post = client.get_post(id).await?;
    print_json(&post)
}

async fn copy(client: &AdminClient, id: &str) -> Result<(), CliError> {
    let post = client.copy_post(id).await?;
    print_json(&post)
}

async fn update(
    client: &AdminClient,
    id: &str,
    data: Option<String>,
    data_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let raw = read_value(data, data_file)?;
    let fields = parse_object(&raw)?;
    let post = client.update_post(id, &fields).await?;
    print_json(&post)
}
