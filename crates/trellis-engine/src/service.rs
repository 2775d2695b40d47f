use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use trellis_config::{TaskNode, TemplateData, TemplateMeta};
use trellis_store::{Flag, Json, NewTemplate, Project, ReleaseState, Store, Template};
use trellis_task::{EnvironmentResolver, TaskRegistry};
use trellis_validator::{
  TemplateValidator, ValidatedTemplate, ValidationError, dedup_global_params, parse_resource_ids,
};

use crate::dispatch::{Direction, correct_payload};
use crate::error::ServiceError;
use crate::naming::{copy_name, import_name, resolve_name};
use crate::permission::ResourceAccess;
use crate::subprocess::Materializer;
use crate::user::{TemplateRequest, User};

/// Tunables of a [`TemplateService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
  /// How many candidate names import tries before giving up.
  pub max_name_attempts: usize,
}

impl Default for ServiceOptions {
  fn default() -> Self {
    Self {
      max_name_attempts: 1000,
    }
  }
}

/// Outcome of a batch delete. Failures do not stop the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchDeleteReport {
  pub deleted: Vec<i64>,
  pub failed: Vec<i64>,
}

/// A template created by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedTemplate {
  pub id: i64,
  pub name: String,
}

/// Outcome of a successful bundle import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub created: Vec<ImportedTemplate>,
}

fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

fn parse_task_nodes(payload: &str) -> Result<Vec<TaskNode>, ValidationError> {
  let data: TemplateData = serde_json::from_str(payload).map_err(ValidationError::MalformedPayload)?;
  Ok(data.tasks.unwrap_or_default())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or(ValidationError::MissingField { field })
}

/// Lifecycle operations on workflow templates.
pub struct TemplateService<S, A> {
  store: S,
  access: A,
  env: Arc<dyn EnvironmentResolver>,
  validator: TemplateValidator,
  options: ServiceOptions,
}

impl<S: Store, A: ResourceAccess> TemplateService<S, A> {
  pub fn new(store: S, access: A, env: Arc<dyn EnvironmentResolver>) -> Self {
    Self {
      store,
      access,
      env,
      validator: TemplateValidator::default(),
      options: ServiceOptions::default(),
    }
  }

  pub fn with_options(mut self, options: ServiceOptions) -> Self {
    self.options = options;
    self
  }

  pub fn with_registry(mut self, registry: Arc<TaskRegistry>) -> Self {
    self.validator = TemplateValidator::new(registry);
    self
  }

  async fn project(&self, name: &str) -> Result<Project, ServiceError> {
    self
      .store
      .get_project_by_name(name)
      .await?
      .ok_or_else(|| ServiceError::ProjectNotFound(name.to_string()))
  }

  async fn template_in(&self, project: &Project, id: i64) -> Result<Template, ServiceError> {
    self
      .store
      .get_template(id)
      .await?
      .filter(|t| t.project_id == project.id)
      .ok_or(ServiceError::TemplateNotFound(id))
  }

  pub async fn create_project(&self, name: &str) -> Result<Project, ServiceError> {
    let project = self.store.create_project(name).await?;
    info!(project = %project.name, project_id = project.id, "created project");
    Ok(project)
  }

  pub async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
    Ok(self.store.list_projects().await?)
  }

  /// Validate a payload without persisting anything.
  pub fn validate_payload(&self, payload: &str) -> Result<ValidatedTemplate, ServiceError> {
    Ok(self.validator.validate_payload(payload)?)
  }

  /// Fails with a conflict if `name` is used in the project.
  pub async fn verify_name(&self, project_name: &str, name: &str) -> Result<(), ServiceError> {
    let project = self.project(project_name).await?;
    if self
      .store
      .get_template_by_name(project.id, name)
      .await?
      .is_some()
    {
      return Err(ServiceError::NameExists {
        project: project.name,
        name: name.to_string(),
      });
    }
    Ok(())
  }

  #[instrument(
    name = "template_create",
    skip(self, user, request),
    fields(project = %project_name, template = %request.name, user = %user.name)
  )]
  pub async fn create_template(
    &self,
    user: &User,
    project_name: &str,
    request: &TemplateRequest,
  ) -> Result<i64, ServiceError> {
    let project = self.project(project_name).await?;
    self.create_in(user, &project, request).await
  }

  async fn create_in(
    &self,
    user: &User,
    project: &Project,
    request: &TemplateRequest,
  ) -> Result<i64, ServiceError> {
    let validated = self.validator.validate_payload(&request.payload)?;

    if self
      .store
      .get_template_by_name(project.id, &request.name)
      .await?
      .is_some()
    {
      return Err(ServiceError::NameExists {
        project: project.name.clone(),
        name: request.name.clone(),
      });
    }

    let id = self
      .store
      .insert_template(&NewTemplate {
        project_id: project.id,
        name: request.name.clone(),
        version: 1,
        release_state: ReleaseState::Offline,
        flag: Flag::Yes,
        description: request.description.clone(),
        user_id: user.id,
        user_name: user.name.clone(),
        modified_by: None,
        payload: request.payload.clone(),
        global_params: dedup_global_params(validated.data.global_params),
        locations: request.locations.clone(),
        connects: request.connects.clone(),
        resource_ids: validated.resource_ids,
        tenant_id: validated.data.tenant_id,
        biz_type_id: request.biz_type_id,
        biz_form_url: request.biz_form_url.clone(),
      })
      .await?;

    info!(project = %project.name, template = %request.name, template_id = id, "created template");
    Ok(id)
  }

  #[instrument(
    name = "template_update",
    skip(self, user, request),
    fields(project = %project_name, template_id = id, user = %user.name)
  )]
  pub async fn update_template(
    &self,
    user: &User,
    project_name: &str,
    id: i64,
    request: &TemplateRequest,
  ) -> Result<(), ServiceError> {
    let project = self.project(project_name).await?;
    let validated = self.validator.validate_payload(&request.payload)?;
    let mut template = self.template_in(&project, id).await?;

    if template.release_state == ReleaseState::Online {
      warn!(template_id = id, "rejecting update of online template");
      return Err(ServiceError::TemplateOnline(id));
    }

    if request.name != template.name
      && self
        .store
        .get_template_by_name(project.id, &request.name)
        .await?
        .is_some()
    {
      return Err(ServiceError::NameExists {
        project: project.name,
        name: request.name.clone(),
      });
    }

    template.name = request.name.clone();
    template.description = request.description.clone();
    template.locations = request.locations.clone();
    template.connects = request.connects.clone();
    template.payload = request.payload.clone();
    template.global_params = Json(dedup_global_params(validated.data.global_params));
    template.resource_ids = validated.resource_ids;
    template.tenant_id = validated.data.tenant_id;
    template.biz_type_id = request.biz_type_id;
    template.biz_form_url = request.biz_form_url.clone();
    template.release_state = ReleaseState::Offline;
    template.version += 1;
    template.modified_by = Some(user.name.clone());

    if !self.store.update_template(&template).await? {
      return Err(ServiceError::TemplateNotFound(id));
    }

    info!(template_id = id, version = template.version, "updated template");
    Ok(())
  }

  /// Create a copy of a template in the same project, named `<name>_copy_<millis>`.
  #[instrument(
    name = "template_copy",
    skip(self, user),
    fields(project = %project_name, template_id = id, user = %user.name)
  )]
  pub async fn copy_template(
    &self,
    user: &User,
    project_name: &str,
    id: i64,
  ) -> Result<i64, ServiceError> {
    let project = self.project(project_name).await?;
    let source = self.template_in(&project, id).await?;

    let request = TemplateRequest {
      name: copy_name(&source.name, now_millis()),
      payload: source.payload,
      description: source.description,
      locations: source.locations,
      connects: source.connects,
      biz_type_id: source.biz_type_id,
      biz_form_url: source.biz_form_url,
    };
    self.create_in(user, &project, &request).await
  }

  /// Set a template ONLINE or OFFLINE.
  ///
  /// Going ONLINE requires every referenced resource to be accessible to
  /// the user.
  #[instrument(
    name = "template_release",
    skip(self, user),
    fields(project = %project_name, template_id = id, user = %user.name)
  )]
  pub async fn release_template(
    &self,
    user: &User,
    project_name: &str,
    id: i64,
    state: ReleaseState,
  ) -> Result<(), ServiceError> {
    let project = self.project(project_name).await?;
    let template = self.template_in(&project, id).await?;

    if state == ReleaseState::Online {
      let resource_ids = parse_resource_ids(&template.resource_ids)?;
      if !resource_ids.is_empty()
        && let Err(denied) = self
          .access
          .check_resources_accessible(&resource_ids, user.id)
          .await
      {
        error!(template_id = id, error = %denied, "release rejected");
        return Err(denied.into());
      }
    }

    if !self.store.update_release_state(id, state).await? {
      return Err(ServiceError::TemplateNotFound(id));
    }

    info!(template_id = id, state = ?state, "released template");
    Ok(())
  }

  /// Delete a template. Only its owner or an admin may do so.
  #[instrument(
    name = "template_delete",
    skip(self, user),
    fields(project = %project_name, template_id = id, user = %user.name)
  )]
  pub async fn delete_template(
    &self,
    user: &User,
    project_name: &str,
    id: i64,
  ) -> Result<(), ServiceError> {
    let project = self.project(project_name).await?;
    self.delete_in(user, &project, id).await
  }

  async fn delete_in(&self, user: &User, project: &Project, id: i64) -> Result<(), ServiceError> {
    let template = self.template_in(project, id).await?;

    if !user.can_modify(template.user_id) {
      return Err(ServiceError::NotOwner {
        user: user.name.clone(),
        template_id: id,
      });
    }

    if !self.store.delete_template(id).await? {
      return Err(ServiceError::TemplateNotFound(id));
    }

    info!(template_id = id, template = %template.name, "deleted template");
    Ok(())
  }

  /// Delete several templates, continuing past failures.
  pub async fn batch_delete(
    &self,
    user: &User,
    project_name: &str,
    ids: &[i64],
  ) -> Result<BatchDeleteReport, ServiceError> {
    let project = self.project(project_name).await?;
    let mut report = BatchDeleteReport::default();

    for &id in ids {
      match self.delete_in(user, &project, id).await {
        Ok(()) => report.deleted.push(id),
        Err(e) => {
          warn!(template_id = id, error = %e, "batch delete item failed");
          report.failed.push(id);
        }
      }
    }

    Ok(report)
  }

  pub async fn get_template(&self, project_name: &str, id: i64) -> Result<Template, ServiceError> {
    let project = self.project(project_name).await?;
    self.template_in(&project, id).await
  }

  pub async fn list_templates(&self, project_name: &str) -> Result<Vec<Template>, ServiceError> {
    let project = self.project(project_name).await?;
    Ok(self.store.list_templates(project.id).await?)
  }

  /// The parsed task list of a template.
  pub async fn task_nodes(&self, id: i64) -> Result<Vec<TaskNode>, ServiceError> {
    let template = self
      .store
      .get_template(id)
      .await?
      .ok_or(ServiceError::TemplateNotFound(id))?;
    Ok(parse_task_nodes(&template.payload)?)
  }

  /// Task lists of several templates, keyed by template id.
  ///
  /// Unknown ids are left out. Fails if none of the ids exist.
  pub async fn task_nodes_by_ids(
    &self,
    ids: &[i64],
  ) -> Result<BTreeMap<i64, Vec<TaskNode>>, ServiceError> {
    let templates = self.store.list_templates_by_ids(ids).await?;
    if templates.is_empty() {
      return Err(ServiceError::TemplatesNotFound(ids.to_vec()));
    }

    templates
      .into_iter()
      .map(|t| -> Result<_, ServiceError> { Ok((t.id, parse_task_nodes(&t.payload)?)) })
      .collect()
  }

  /// Export bundle entries for the given ids, one per requested id in
  /// request order. Unknown ids are skipped.
  pub async fn export_metas(
    &self,
    project_name: &str,
    ids: &[i64],
  ) -> Result<Vec<TemplateMeta>, ServiceError> {
    self.project(project_name).await?;
    let templates: HashMap<i64, Template> = self
      .store
      .list_templates_by_ids(ids)
      .await?
      .into_iter()
      .map(|t| (t.id, t))
      .collect();
    let registry = self.validator.registry();

    let mut metas = Vec::with_capacity(ids.len());
    for template in ids.iter().filter_map(|id| templates.get(id)) {
      let payload = correct_payload(
        &template.payload,
        Direction::Export,
        registry,
        self.env.as_ref(),
      )
      .await?;

      metas.push(TemplateMeta {
        project_name: Some(template.project_name.clone()),
        process_template_name: Some(template.name.clone()),
        process_template_json: Some(payload.to_string()),
        process_template_locations: Some(template.locations.clone()),
        process_template_connects: Some(template.connects.clone()),
        ..Default::default()
      });
    }

    Ok(metas)
  }

  /// The export document for the given ids, as JSON bytes.
  #[instrument(name = "template_export", skip(self, ids), fields(project = %project_name, count = ids.len()))]
  pub async fn export_templates(
    &self,
    project_name: &str,
    ids: &[i64],
  ) -> Result<Vec<u8>, ServiceError> {
    let metas = self.export_metas(project_name, ids).await?;
    info!(exported = metas.len(), "exported templates");
    serde_json::to_vec(&metas).map_err(ServiceError::Serialize)
  }

  /// Write the export document to `writer`. A write failure is not retried.
  pub async fn write_export<W: Write>(
    &self,
    project_name: &str,
    ids: &[i64],
    writer: &mut W,
  ) -> Result<(), ServiceError> {
    let document = self.export_templates(project_name, ids).await?;
    writer
      .write_all(&document)
      .and_then(|()| writer.flush())
      .map_err(|e| {
        warn!(error = %e, "export write failed");
        ServiceError::Io(e)
      })
  }

  /// Import every entry of an export bundle into a project.
  ///
  /// Stops at the first entry that fails. Entries imported before it stay.
  #[instrument(
    name = "template_import",
    skip(self, user, bundle),
    fields(project = %project_name, user = %user.name)
  )]
  pub async fn import_bundle(
    &self,
    user: &User,
    project_name: &str,
    bundle: &[u8],
  ) -> Result<ImportReport, ServiceError> {
    let metas: Vec<TemplateMeta> = if bundle.trim_ascii().is_empty() {
      Vec::new()
    } else {
      serde_json::from_slice::<Option<Vec<TemplateMeta>>>(bundle)
        .map_err(ValidationError::MalformedPayload)?
        .unwrap_or_default()
    };
    if metas.is_empty() {
      return Err(ValidationError::EmptyBundle.into());
    }

    let project = self.project(project_name).await?;
    let mut report = ImportReport::default();

    for meta in metas {
      match self.import_one(user, &project, meta).await {
        Ok(imported) => report.created.push(imported),
        Err(e) => {
          error!(error = %e, imported = report.created.len(), "import aborted");
          return Err(e);
        }
      }
    }

    Ok(report)
  }

  async fn import_one(
    &self,
    user: &User,
    project: &Project,
    meta: TemplateMeta,
  ) -> Result<ImportedTemplate, ServiceError> {
    required(meta.project_name, "projectName")?;
    let base = required(meta.process_template_name, "processTemplateName")?;
    let json = required(meta.process_template_json, "processTemplateJson")?;

    let existing: HashSet<String> = self
      .store
      .list_templates(project.id)
      .await?
      .into_iter()
      .map(|t| t.name)
      .collect();
    let resolved = resolve_name(&base, &existing, self.options.max_name_attempts)
      .ok_or_else(|| ServiceError::NamesExhausted(base.clone(), self.options.max_name_attempts))?;

    let mut payload = correct_payload(
      &json,
      Direction::Import,
      self.validator.registry(),
      self.env.as_ref(),
    )
    .await?;
    Materializer::new(&self.store, project, user)
      .materialize(&mut payload, &mut Vec::new())
      .await?;

    let request = TemplateRequest {
      name: import_name(&resolved, now_millis()),
      payload: payload.to_string(),
      description: meta.process_template_description.unwrap_or_default(),
      locations: meta.process_template_locations.unwrap_or_default(),
      connects: meta.process_template_connects.unwrap_or_default(),
      biz_type_id: meta.biz_type_id,
      biz_form_url: meta.biz_form_url,
    };
    let id = self.create_in(user, project, &request).await?;

    info!(template_id = id, template = %request.name, source = %base, "imported template");
    Ok(ImportedTemplate {
      id,
      name: request.name,
    })
  }
}
