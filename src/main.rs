use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use trellis_engine::{AllowAll, TemplateRequest, TemplateService, User};
use trellis_store::{ReleaseState, SqliteStore};
use trellis_task::StaticEnvironment;

type Service = TemplateService<SqliteStore, AllowAll>;

/// Trellis - validate, store and move workflow templates between environments
#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.trellis)
  #[arg(long, global = true, env = "TRELLIS_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Path to the SQLite database (default: <data-dir>/trellis.db)
  #[arg(long, global = true, env = "TRELLIS_DATABASE")]
  database: Option<PathBuf>,

  /// Name of the acting user
  #[arg(long, global = true, default_value = "trellis")]
  user: String,

  /// Id of the acting user
  #[arg(long, global = true, default_value_t = 1)]
  user_id: i64,

  /// Act as an admin
  #[arg(long, global = true)]
  admin: bool,

  /// JSON catalog of datasources and workflow definitions of this environment
  #[arg(long, global = true)]
  environment: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage projects
  Project {
    #[command(subcommand)]
    action: ProjectCommand,
  },

  /// Validate a template payload without storing it
  Validate {
    /// Path to the payload file
    payload_file: PathBuf,
  },

  /// Manage templates
  Template {
    #[command(subcommand)]
    action: TemplateCommand,
  },
}

#[derive(Subcommand)]
enum ProjectCommand {
  /// Create a project
  Create { name: String },

  /// List projects
  List,
}

#[derive(clap::Args)]
struct TemplateFields {
  /// Template name
  #[arg(long)]
  name: String,

  /// Path to the payload file
  payload_file: PathBuf,

  #[arg(long, default_value = "")]
  description: String,

  /// Path to a file holding the layout locations
  #[arg(long)]
  locations: Option<PathBuf>,

  /// Path to a file holding the layout connects
  #[arg(long)]
  connects: Option<PathBuf>,

  #[arg(long)]
  biz_type_id: Option<i64>,

  #[arg(long)]
  biz_form_url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum State {
  Online,
  Offline,
}

impl From<State> for ReleaseState {
  fn from(state: State) -> Self {
    match state {
      State::Online => ReleaseState::Online,
      State::Offline => ReleaseState::Offline,
    }
  }
}

#[derive(Subcommand)]
enum TemplateCommand {
  /// Create a template from a payload file
  Create {
    #[arg(long)]
    project: String,
    #[command(flatten)]
    fields: TemplateFields,
  },

  /// Replace a template's payload and fields
  Update {
    #[arg(long)]
    project: String,
    #[arg(long)]
    id: i64,
    #[command(flatten)]
    fields: TemplateFields,
  },

  /// Copy a template within its project
  Copy {
    #[arg(long)]
    project: String,
    #[arg(long)]
    id: i64,
  },

  /// Set a template online or offline
  Release {
    #[arg(long)]
    project: String,
    #[arg(long)]
    id: i64,
    #[arg(long, value_enum)]
    state: State,
  },

  /// Delete one or more templates
  Delete {
    #[arg(long)]
    project: String,
    #[arg(long, value_delimiter = ',', required = true)]
    ids: Vec<i64>,
  },

  /// List the templates of a project
  List {
    #[arg(long)]
    project: String,
  },

  /// Show a template
  Show {
    #[arg(long)]
    project: String,
    #[arg(long)]
    id: i64,
    /// Print the parsed task list instead of the row
    #[arg(long)]
    tasks: bool,
  },

  /// Export templates to a bundle
  Export {
    #[arg(long)]
    project: String,
    #[arg(long, value_delimiter = ',', required = true)]
    ids: Vec<i64>,
    /// Write the bundle here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
  },

  /// Import a bundle into a project
  Import {
    #[arg(long)]
    project: String,
    bundle_file: PathBuf,
  },
}

fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| "trellis=info".into()))
    .with(fmt::layer().with_writer(std::io::stderr))
    .init();
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let Some(command) = cli.command else {
    println!("trellis - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".trellis"),
  };
  let database = cli
    .database
    .unwrap_or_else(|| data_dir.join("trellis.db"));
  let user = if cli.admin {
    User::admin(cli.user_id, cli.user)
  } else {
    User::new(cli.user_id, cli.user)
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let service = open_service(&database, cli.environment.as_deref()).await?;
    run(&service, &user, command).await
  })
}

async fn open_service(database: &Path, environment: Option<&Path>) -> Result<Service> {
  if let Some(parent) = database.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create data directory: {}", parent.display()))?;
  }

  let options = SqliteConnectOptions::new()
    .filename(database)
    .create_if_missing(true);
  let pool = SqlitePoolOptions::new()
    .connect_with(options)
    .await
    .with_context(|| format!("failed to open database: {}", database.display()))?;

  let store = SqliteStore::new(pool);
  store.migrate().await.context("failed to run migrations")?;
  info!(database = %database.display(), "opened store");

  let env = match environment {
    Some(path) => {
      let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read environment file: {}", path.display()))?;
      StaticEnvironment::from_json(&content)
        .with_context(|| format!("failed to parse environment file: {}", path.display()))?
    }
    None => StaticEnvironment::default(),
  };

  Ok(TemplateService::new(store, AllowAll, Arc::new(env)))
}

async fn read_file(path: &Path) -> Result<String> {
  tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read file: {}", path.display()))
}

async fn read_optional(path: Option<&Path>) -> Result<String> {
  match path {
    Some(path) => read_file(path).await,
    None => Ok(String::new()),
  }
}

async fn template_request(fields: TemplateFields) -> Result<TemplateRequest> {
  Ok(TemplateRequest {
    payload: read_file(&fields.payload_file).await?,
    locations: read_optional(fields.locations.as_deref()).await?,
    connects: read_optional(fields.connects.as_deref()).await?,
    name: fields.name,
    description: fields.description,
    biz_type_id: fields.biz_type_id,
    biz_form_url: fields.biz_form_url,
  })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

async fn run(service: &Service, user: &User, command: Commands) -> Result<()> {
  match command {
    Commands::Project { action } => match action {
      ProjectCommand::Create { name } => {
        let project = service
          .create_project(&name)
          .await
          .context("failed to create project")?;
        print_json(&project)
      }
      ProjectCommand::List => print_json(&service.list_projects().await?),
    },

    Commands::Validate { payload_file } => {
      let payload = read_file(&payload_file).await?;
      let validated = service
        .validate_payload(&payload)
        .context("template payload is invalid")?;
      print_json(&json!({
        "valid": true,
        "tasks": validated.data.tasks().len(),
        "resourceIds": validated.resource_ids,
      }))
    }

    Commands::Template { action } => run_template(service, user, action).await,
  }
}

async fn run_template(service: &Service, user: &User, action: TemplateCommand) -> Result<()> {
  match action {
    TemplateCommand::Create { project, fields } => {
      let request = template_request(fields).await?;
      let id = service
        .create_template(user, &project, &request)
        .await
        .context("failed to create template")?;
      print_json(&json!({ "id": id }))
    }

    TemplateCommand::Update {
      project,
      id,
      fields,
    } => {
      let request = template_request(fields).await?;
      service
        .update_template(user, &project, id, &request)
        .await
        .context("failed to update template")?;
      print_json(&service.get_template(&project, id).await?)
    }

    TemplateCommand::Copy { project, id } => {
      let copy = service
        .copy_template(user, &project, id)
        .await
        .context("failed to copy template")?;
      print_json(&json!({ "id": copy }))
    }

    TemplateCommand::Release { project, id, state } => {
      service
        .release_template(user, &project, id, state.into())
        .await
        .context("failed to release template")?;
      print_json(&service.get_template(&project, id).await?)
    }

    TemplateCommand::Delete { project, ids } => {
      if let [id] = ids.as_slice() {
        service
          .delete_template(user, &project, *id)
          .await
          .context("failed to delete template")?;
        print_json(&json!({ "deleted": [id], "failed": [] }))
      } else {
        print_json(&service.batch_delete(user, &project, &ids).await?)
      }
    }

    TemplateCommand::List { project } => print_json(&service.list_templates(&project).await?),

    TemplateCommand::Show { project, id, tasks } => {
      let template = service.get_template(&project, id).await?;
      if tasks {
        print_json(&service.task_nodes(template.id).await?)
      } else {
        print_json(&template)
      }
    }

    TemplateCommand::Export {
      project,
      ids,
      output,
    } => match output {
      Some(path) => {
        let mut file = std::fs::File::create(&path)
          .with_context(|| format!("failed to create export file: {}", path.display()))?;
        service
          .write_export(&project, &ids, &mut file)
          .await
          .context("failed to export templates")?;
        eprintln!("Exported to {}", path.display());
        Ok(())
      }
      None => {
        let mut stdout = std::io::stdout();
        service
          .write_export(&project, &ids, &mut stdout)
          .await
          .context("failed to export templates")?;
        println!();
        Ok(())
      }
    },

    TemplateCommand::Import {
      project,
      bundle_file,
    } => {
      let bundle = tokio::fs::read(&bundle_file)
        .await
        .with_context(|| format!("failed to read bundle: {}", bundle_file.display()))?;
      let report = service
        .import_bundle(user, &project, &bundle)
        .await
        .context("failed to import bundle")?;
      print_json(&report)
    }
  }
}
