use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{Error, NewTemplate, Project, ReleaseState, Store, Template};

const SELECT_TEMPLATE: &str = r#"
  SELECT t.id, t.project_id, p.name AS project_name, t.name, t.version, t.release_state,
         t.flag, t.description, t.user_id, t.user_name, t.modified_by, t.payload,
         t.global_params, t.locations, t.connects, t.resource_ids, t.tenant_id,
         t.biz_type_id, t.biz_form_url, t.created_at, t.updated_at
  FROM process_templates t
  JOIN projects p ON p.id = t.project_id
"#;

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), Error> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }
}

impl Store for SqliteStore {
  async fn create_project(&self, name: &str) -> Result<Project, Error> {
    let created_at = Utc::now();
    let id = sqlx::query("INSERT INTO projects (name, created_at) VALUES (?, ?)")
      .bind(name)
      .bind(created_at)
      .execute(&self.pool)
      .await
      .map_err(|e| Error::from_insert("project", name, e))?
      .last_insert_rowid();

    Ok(Project {
      id,
      name: name.to_string(),
      created_at,
    })
  }

  async fn get_project_by_name(&self, name: &str) -> Result<Option<Project>, Error> {
    let project: Option<Project> = sqlx::query_as("SELECT id, name, created_at FROM projects WHERE name = ?")
      .bind(name)
      .fetch_optional(&self.pool)
      .await?;
    Ok(project)
  }

  async fn list_projects(&self) -> Result<Vec<Project>, Error> {
    let projects: Vec<Project> = sqlx::query_as("SELECT id, name, created_at FROM projects ORDER BY id")
      .fetch_all(&self.pool)
      .await?;
    Ok(projects)
  }

  async fn insert_template(&self, template: &NewTemplate) -> Result<i64, Error> {
    let now = Utc::now();
    let result = sqlx::query(
      r#"
            INSERT INTO process_templates (
              project_id, name, version, release_state, flag, description, user_id, user_name,
              modified_by, payload, global_params, locations, connects, resource_ids, tenant_id,
              biz_type_id, biz_form_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
    )
    .bind(template.project_id)
    .bind(&template.name)
    .bind(template.version)
    .bind(template.release_state)
    .bind(template.flag)
    .bind(&template.description)
    .bind(template.user_id)
    .bind(&template.user_name)
    .bind(&template.modified_by)
    .bind(&template.payload)
    .bind(Json(&template.global_params))
    .bind(&template.locations)
    .bind(&template.connects)
    .bind(&template.resource_ids)
    .bind(template.tenant_id)
    .bind(template.biz_type_id)
    .bind(&template.biz_form_url)
    .bind(now)
    .bind(now)
    .execute(&self.pool)
    .await
    .map_err(|e| Error::from_insert("template", &template.name, e))?;

    Ok(result.last_insert_rowid())
  }

  async fn get_template(&self, id: i64) -> Result<Option<Template>, Error> {
    let template: Option<Template> = sqlx::query_as(&format!("{SELECT_TEMPLATE} WHERE t.id = ?"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(template)
  }

  async fn get_template_by_name(
    &self,
    project_id: i64,
    name: &str,
  ) -> Result<Option<Template>, Error> {
    let template: Option<Template> = sqlx::query_as(&format!(
      "{SELECT_TEMPLATE} WHERE t.project_id = ? AND t.name = ?"
    ))
    .bind(project_id)
    .bind(name)
    .fetch_optional(&self.pool)
    .await?;
    Ok(template)
  }

  async fn list_templates(&self, project_id: i64) -> Result<Vec<Template>, Error> {
    let templates: Vec<Template> = sqlx::query_as(&format!(
      "{SELECT_TEMPLATE} WHERE t.project_id = ? ORDER BY t.id"
    ))
    .bind(project_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(templates)
  }

  async fn list_templates_by_ids(&self, ids: &[i64]) -> Result<Vec<Template>, Error> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(SELECT_TEMPLATE);
    query.push(" WHERE t.id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
      separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY t.id");

    let templates = query
      .build_query_as::<Template>()
      .fetch_all(&self.pool)
      .await?;
    Ok(templates)
  }

  async fn update_template(&self, template: &Template) -> Result<bool, Error> {
    let result = sqlx::query(
      r#"
            UPDATE process_templates
            SET name = ?, version = ?, release_state = ?, flag = ?, description = ?,
                modified_by = ?, payload = ?, global_params = ?, locations = ?, connects = ?,
                resource_ids = ?, tenant_id = ?, biz_type_id = ?, biz_form_url = ?, updated_at = ?
            WHERE id = ?
            "#,
    )
    .bind(&template.name)
    .bind(template.version)
    .bind(template.release_state)
    .bind(template.flag)
    .bind(&template.description)
    .bind(&template.modified_by)
    .bind(&template.payload)
    .bind(&template.global_params)
    .bind(&template.locations)
    .bind(&template.connects)
    .bind(&template.resource_ids)
    .bind(template.tenant_id)
    .bind(template.biz_type_id)
    .bind(&template.biz_form_url)
    .bind(Utc::now())
    .bind(template.id)
    .execute(&self.pool)
    .await
    .map_err(|e| Error::from_insert("template", &template.name, e))?;

    Ok(result.rows_affected() > 0)
  }

  async fn update_release_state(&self, id: i64, state: ReleaseState) -> Result<bool, Error> {
    let result =
      sqlx::query("UPDATE process_templates SET release_state = ?, updated_at = ? WHERE id = ?")
        .bind(state)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_template(&self, id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM process_templates WHERE id = ?")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}
