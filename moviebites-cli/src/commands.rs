use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use moviebites_client::{
    ApiClient, FileIdentityStore, IdentityStore, MemoryIdentityStore,
    ReactionsApi, Session,
};
use moviebites_config::{ClientConfig, ConfigLoader, util::normalize_base_url};
use moviebites_model::{
    ListParams, LoginRequest, ReactionQuery, ReactionRequest, SearchParams,
    UserClaim, UserLikesQuery,
};
use serde_json::{Value, json};

use crate::cli::{
    CategoriesAction, Cli, Command, PageArgs, ReactionAction, UsersAction,
    WebseriesAction,
};

/// Everything a command needs: the client and the session sharing its
/// identity store.
#[derive(Debug)]
pub struct CommandContext {
    client: ApiClient,
    session: Session,
    store_location: Option<String>,
}

impl CommandContext {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;
        let (store, store_location) = open_store(&config);
        let client = ApiClient::new(&config, store)
            .context("Failed to build the HTTP client")?;
        let session = Session::from_client(&client);
        session
            .load_from_storage()
            .await
            .context("Failed to read the identity store")?;
        Ok(Self {
            client,
            session,
            store_location,
        })
    }

    /// Signed-in user id for reaction bodies, or an error telling the user
    /// how to get one.
    fn require_social_id(&self) -> Result<String> {
        match self.session.social_id() {
            Some(social_id) => Ok(social_id),
            None => bail!("Not signed in; run `moviebites upsert` or `moviebites login` first"),
        }
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    } else if cli.no_env_file {
        loader = loader.without_env_file();
    }

    let load = loader.load().context("Failed to load configuration")?;
    for warning in &load.warnings {
        warn!("{}", warning);
    }
    if let Some(path) = &load.metadata.config_path {
        info!("[Config] Using {}", path.display());
    }

    let mut config = load.config;
    if let Some(raw) = &cli.base_url {
        config.base_url =
            normalize_base_url(raw).context("Invalid --base-url")?;
    }
    Ok(config)
}

fn open_store(config: &ClientConfig) -> (Arc<dyn IdentityStore>, Option<String>) {
    match config.resolved_identity_path() {
        Some(path) => {
            let location = path.display().to_string();
            (Arc::new(FileIdentityStore::new(path)), Some(location))
        }
        None => {
            warn!("No data directory available; identity will not persist");
            (Arc::new(MemoryIdentityStore::new()), None)
        }
    }
}

fn list_params(args: PageArgs) -> ListParams {
    let mut params = ListParams::new();
    if let Some(page) = args.page {
        params = params.page(page);
    }
    if let Some(limit) = args.limit {
        params = params.limit(limit);
    }
    args.filters
        .into_iter()
        .fold(params, |params, (key, value)| params.filter(key, value))
}

/// Run one command and return the payload to print.
pub async fn run(ctx: &CommandContext, command: Command) -> Result<Value> {
    let payload = match command {
        Command::Webseries { action } => webseries(ctx, action).await?,
        Command::Categories { action } => categories(ctx, action).await?,
        Command::Favorites { action } => {
            reaction(ctx, ctx.client.favorites(), action).await?
        }
        Command::Likes { action } => {
            reaction(ctx, ctx.client.likes(), action).await?
        }
        Command::Users { action } => users(ctx, action).await?,
        Command::Upsert(args) => {
            let claim = UserClaim {
                social_id: args.social_id,
                email: args.email,
                password: args.password,
                name: args.name,
            };
            ctx.session.upsert(&claim).await?
        }
        Command::Login(args) => {
            let credentials = LoginRequest {
                email: args.email,
                password: args.password,
                social_id: args.social_id,
            };
            ctx.session.login(&credentials).await?
        }
        Command::Logout => {
            ctx.session
                .logout()
                .await
                .context("Failed to clear the stored identity")?;
            json!({ "signed_in": false })
        }
        Command::Whoami => {
            let identity = ctx.client.resolve_identity().await;
            json!({
                "identity": identity,
                "base_url": ctx.client.base_url(),
                "identity_store": ctx.store_location,
            })
        }
    };
    Ok(payload)
}

async fn webseries(ctx: &CommandContext, action: WebseriesAction) -> Result<Value> {
    let api = ctx.client.webseries();
    let payload = match action {
        WebseriesAction::List(args) => api.get_all(&list_params(args)).await?,
        WebseriesAction::Get { id } => api.get_by_id(&id).await?,
        WebseriesAction::Slug { slug } => api.get_by_slug(&slug).await?,
        WebseriesAction::Search { query, limit } => {
            let mut params = SearchParams::new(query);
            if let Some(limit) = limit {
                params = params.limit(limit);
            }
            api.search(&params).await?
        }
        WebseriesAction::Create { data } => api.create(&data).await?,
        WebseriesAction::Update { id, data } => api.update(&id, &data).await?,
        WebseriesAction::Delete { id } => api.remove(&id).await?,
    };
    Ok(payload)
}

async fn categories(ctx: &CommandContext, action: CategoriesAction) -> Result<Value> {
    let api = ctx.client.categories();
    let payload = match action {
        CategoriesAction::List(args) => api.get_all(&list_params(args)).await?,
        CategoriesAction::Search { query, page } => {
            api.search(&query, &list_params(page)).await?
        }
        CategoriesAction::Get { id } => api.get_by_id(&id).await?,
        CategoriesAction::Create { data } => api.create(&data).await?,
        CategoriesAction::Update { id, data } => api.update(&id, &data).await?,
        CategoriesAction::Delete { id } => api.remove(&id).await?,
    };
    Ok(payload)
}

async fn reaction(
    ctx: &CommandContext,
    api: ReactionsApi,
    action: ReactionAction,
) -> Result<Value> {
    let payload = match action {
        ReactionAction::Check {
            webseries_id,
            episode,
        } => {
            let query = ReactionQuery {
                episode_number: episode,
            };
            api.check(&webseries_id, &query).await?
        }
        ReactionAction::Add {
            webseries_id,
            episode,
        } => {
            let body = reaction_body(ctx, episode)?;
            api.add(&webseries_id, &body).await?
        }
        ReactionAction::Remove {
            webseries_id,
            episode,
        } => {
            let body = reaction_body(ctx, episode)?;
            api.remove(&webseries_id, &body).await?
        }
        ReactionAction::Count { webseries_id } => {
            api.count(&webseries_id).await?
        }
    };
    Ok(payload)
}

fn reaction_body(ctx: &CommandContext, episode: Option<u32>) -> Result<ReactionRequest> {
    let body = ReactionRequest::new(ctx.require_social_id()?);
    Ok(match episode {
        Some(episode) => body.for_episode(episode),
        None => body,
    })
}

async fn users(ctx: &CommandContext, action: UsersAction) -> Result<Value> {
    match action {
        UsersAction::Likes {
            include_episodes,
            episode_id,
            episode_number,
        } => {
            let query = UserLikesQuery {
                include_episodes: include_episodes.then_some(true),
                episode_id,
                episode_number,
            };
            Ok(ctx.client.users().likes(&query).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_args_become_list_params() {
        let params = list_params(PageArgs {
            page: Some(2),
            limit: None,
            filters: vec![("genre".into(), "drama".into())],
        });
        assert_eq!(params, ListParams::new().page(2).filter("genre", "drama"));
    }
}
