//! ImportService: inserts whole project hierarchies exported from another board.

use super::{bucket_service, project_service, task_service, user_service};
use crate::{
    errors::ServiceResult,
    models::{
        bucket::NewBucket,
        import::{BucketImport, ChecklistImport, LabelImport, ProjectImport},
        project::{NewProject, Project},
        task::NewTask,
        user::User,
    },
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::{borrow::Cow, collections::HashMap, sync::Arc};
use tracing::{debug, info};

/// Hex colors (without `#`) for the color names of imported labels.
const LABEL_COLORS: &[(&str, &str)] = &[
    ("green", "4bce97"),
    ("yellow", "f5cd47"),
    ("orange", "fea362"),
    ("red", "f87168"),
    ("purple", "9f8fef"),
    ("blue", "579dff"),
    ("sky", "6cc3e0"),
    ("lime", "94c748"),
    ("pink", "e774bb"),
    ("black", "8590a2"),
    ("green_dark", "1f845a"),
    ("yellow_dark", "946f00"),
    ("orange_dark", "c25100"),
    ("red_dark", "c9372c"),
    ("purple_dark", "6e5dc6"),
    ("blue_dark", "0c66e4"),
    ("sky_dark", "227d9b"),
    ("lime_dark", "5b7f24"),
    ("pink_dark", "ae4787"),
    ("black_dark", "626f86"),
    ("green_light", "baf3db"),
    ("yellow_light", "f8e6a0"),
    ("orange_light", "fedec8"),
    ("red_light", "ffd5d2"),
    ("purple_light", "dfd8fd"),
    ("blue_light", "cce0ff"),
    ("sky_light", "c6edfb"),
    ("lime_light", "d3f1a7"),
    ("pink_light", "fdd0ec"),
    ("black_light", "dcdfe4"),
    ("transparent", ""),
];

/// Hex color for a color name; unknown names are transparent (empty).
pub fn label_hex_color(name: &str) -> &'static str {
    LABEL_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name.trim()))
        .map(|(_, hex)| *hex)
        .unwrap_or_default()
}

/// Append each checklist to `description` as an HTML task list.
fn with_checklists(description: Option<&str>, checklists: &[ChecklistImport]) -> Option<String> {
    if checklists.is_empty() {
        return description.map(str::to_string);
    }
    let mut out = description.unwrap_or_default().to_string();
    for checklist in checklists {
        out.push_str(&format!(
            "\n\n<h2>{}</h2>\n\n<ul data-type=\"taskList\">",
            escape_html(&checklist.name)
        ));
        for item in &checklist.items {
            let (state, checkbox) = if item.checked {
                ("true", r#"<input type="checkbox" checked="checked">"#)
            } else {
                ("false", r#"<input type="checkbox">"#)
            };
            out.push_str(&format!(
                "\n<li data-checked=\"{}\" data-type=\"taskItem\"><label>{}<span></span></label><div><p>{}</p></div></li>",
                state,
                checkbox,
                escape_html(&item.name)
            ));
        }
        out.push_str("</ul>");
    }
    Some(out.trim_start().to_string())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Clone)]
pub struct ImportService {
    pub db: Arc<SqlitePool>,
}

impl ImportService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert every project with its buckets, tasks and labels, owned by `actor`.
    ///
    /// Either everything is imported or nothing is. Buckets and tasks keep their
    /// input order. Bucket limits are stored but not enforced while importing. A
    /// project without buckets gets the usual first bucket.
    pub async fn import(&self, actor: i64, projects: Vec<ProjectImport>) -> ServiceResult<Vec<Project>> {
        let mut tx = self.db.begin().await?;
        let owner = user_service::require_actor(&mut tx, actor).await?;
        let mut labels = LabelCache::default();
        let mut created = Vec::with_capacity(projects.len());
        let mut task_count = 0;

        for import in &projects {
            let new = NewProject {
                title: import.title.clone(),
                description: import.description.clone(),
            };
            let project = project_service::insert_project(&mut tx, &owner, &new).await?;

            let buckets: Cow<'_, [BucketImport]> = if import.buckets.is_empty() {
                Cow::Owned(vec![BucketImport {
                    title: project_service::FIRST_BUCKET_TITLE.into(),
                    ..Default::default()
                }])
            } else {
                Cow::Borrowed(import.buckets.as_slice())
            };

            for bucket_import in buckets.iter() {
                let new_bucket = NewBucket {
                    title: bucket_import.title.clone(),
                    limit: bucket_import.limit,
                    position: 0.0,
                };
                let bucket =
                    bucket_service::insert_bucket(&mut tx, project.id, &new_bucket, &owner).await?;

                for task_import in &bucket_import.tasks {
                    let new_task = NewTask {
                        title: task_import.title.clone(),
                        description: with_checklists(
                            task_import.description.as_deref(),
                            &task_import.checklists,
                        ),
                        bucket_id: Some(bucket.id),
                        due_date: task_import.due_date,
                        ..Default::default()
                    };
                    let task = task_service::insert_task(
                        &mut tx,
                        &project,
                        &bucket,
                        &owner,
                        &new_task,
                        task_import.done,
                    )
                    .await?;
                    for label in &task_import.labels {
                        let label_id = labels.resolve(&mut tx, &owner, label).await?;
                        sqlx::query(
                            "INSERT OR IGNORE INTO label_tasks (task_id, label_id, created)
                             VALUES (?, ?, ?)",
                        )
                        .bind(task.id)
                        .bind(label_id)
                        .bind(Utc::now())
                        .execute(&mut *tx)
                        .await?;
                    }
                    task_count += 1;
                }
            }
            debug!("imported project {} ({} buckets)", project.id, buckets.len());
            created.push(project);
        }
        tx.commit().await?;

        info!(
            "imported {} projects with {} tasks and {} labels for user {}",
            created.len(),
            task_count,
            labels.ids.len(),
            owner.id
        );
        Ok(created)
    }
}

/// Labels created during one import, keyed by title and color.
#[derive(Default)]
struct LabelCache {
    ids: HashMap<(String, &'static str), i64>,
}

impl LabelCache {
    async fn resolve(
        &mut self,
        conn: &mut SqliteConnection,
        owner: &User,
        label: &LabelImport,
    ) -> ServiceResult<i64> {
        let key = (label.title.trim().to_string(), label_hex_color(&label.color));
        if let Some(id) = self.ids.get(&key) {
            return Ok(*id);
        }

        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO labels (title, hex_color, created_by_id, created, updated)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&key.0)
        .bind(key.1)
        .bind(owner.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        self.ids.insert(key, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ServiceError,
        models::import::{ChecklistItemImport, TaskImport},
        services::{task_filter::TaskFilterOptions, testing::Fixture},
    };

    fn label(title: &str, color: &str) -> LabelImport {
        LabelImport {
            title: title.into(),
            color: color.into(),
        }
    }

    fn task(title: &str, done: bool, labels: Vec<LabelImport>) -> TaskImport {
        TaskImport {
            title: title.into(),
            done,
            labels,
            ..Default::default()
        }
    }

    #[test]
    fn color_names_map_to_hex() {
        assert_eq!(label_hex_color("green"), "4bce97");
        assert_eq!(label_hex_color("pink_light"), "fdd0ec");
        assert_eq!(label_hex_color(" Sky_Dark "), "227d9b");
        assert_eq!(label_hex_color("transparent"), "");
        assert_eq!(label_hex_color("chartreuse"), "");
    }

    #[tokio::test]
    async fn import_keeps_order_and_shares_labels() {
        let fx = Fixture::new().await;
        let projects = vec![ProjectImport {
            title: "Imported".into(),
            description: "from elsewhere".into(),
            buckets: vec![
                BucketImport {
                    title: "Todo".into(),
                    limit: 0,
                    tasks: vec![
                        task("first", false, vec![label("bug", "red")]),
                        task("second", false, vec![label("bug", "red"), label("ui", "sky")]),
                    ],
                },
                BucketImport {
                    title: "Done".into(),
                    limit: 1,
                    tasks: vec![task("old", true, vec![]), task("older", true, vec![])],
                },
            ],
        }];

        let created = fx.imports.import(fx.owner.id, projects).await.unwrap();
        assert_eq!(created.len(), 1);
        let project = &created[0];

        let board = fx
            .boards
            .read_board(fx.owner.id, project.id, &TaskFilterOptions::default())
            .await
            .unwrap();
        let buckets: Vec<_> = board.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(buckets, vec!["Todo", "Done"]);
        assert!(board[0].position < board[1].position);

        let todo: Vec<_> = board[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(todo, vec!["first", "second"]);
        assert_eq!(board[0].tasks[0].labels[0].hex_color, "f87168");
        assert_eq!(board[0].tasks[0].labels[0].id, board[0].tasks[1].labels[0].id);
        assert_eq!(board[0].tasks[1].labels.len(), 2);

        // limits are not enforced on import
        assert_eq!(board[1].tasks.len(), 2);
        assert!(board[1].tasks.iter().all(|t| t.done));
    }

    #[test]
    fn checklists_render_into_the_description() {
        let checklists = vec![ChecklistImport {
            name: "Steps".into(),
            items: vec![
                ChecklistItemImport {
                    name: "plan".into(),
                    checked: true,
                },
                ChecklistItemImport {
                    name: "a < b".into(),
                    checked: false,
                },
            ],
        }];

        let rendered = with_checklists(Some("Intro"), &checklists).unwrap();
        assert!(rendered.starts_with("Intro\n\n<h2>Steps</h2>"));
        assert!(rendered.contains(r#"<li data-checked="true" data-type="taskItem">"#));
        assert!(rendered.contains(r#"<li data-checked="false" data-type="taskItem">"#));
        assert!(rendered.contains("<p>a &lt; b</p>"));
        assert!(rendered.ends_with("</ul>"));

        let bare = with_checklists(None, &checklists).unwrap();
        assert!(bare.starts_with("<h2>Steps</h2>"));
        assert_eq!(with_checklists(None, &[]), None);
        assert_eq!(with_checklists(Some("kept"), &[]).as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn imported_checklists_land_in_the_task() {
        let fx = Fixture::new().await;
        let projects = vec![ProjectImport {
            title: "Lists".into(),
            buckets: vec![BucketImport {
                title: "Todo".into(),
                tasks: vec![TaskImport {
                    title: "with steps".into(),
                    checklists: vec![ChecklistImport {
                        name: "Steps".into(),
                        items: vec![ChecklistItemImport {
                            name: "one".into(),
                            checked: true,
                        }],
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];

        let created = fx.imports.import(fx.owner.id, projects).await.unwrap();
        let (tasks, _) = fx.list_tasks(created[0].id).await;
        let description = tasks[0].description.as_deref().unwrap();
        assert!(description.contains("<h2>Steps</h2>"));
        assert!(description.contains("<p>one</p>"));
    }

    #[tokio::test]
    async fn project_without_buckets_gets_a_backlog() {
        let fx = Fixture::new().await;
        let created = fx
            .imports
            .import(
                fx.owner.id,
                vec![ProjectImport {
                    title: "Empty".into(),
                    ..Default::default()
                }],
            )
            .await
            .unwrap();

        let buckets = fx
            .buckets
            .list_by_project(fx.owner.id, created[0].id)
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].title, project_service::FIRST_BUCKET_TITLE);
    }

    #[tokio::test]
    async fn invalid_entry_rolls_back_everything() {
        let fx = Fixture::new().await;
        let err = fx
            .imports
            .import(
                fx.owner.id,
                vec![
                    ProjectImport {
                        title: "Fine".into(),
                        ..Default::default()
                    },
                    ProjectImport {
                        title: "Broken".into(),
                        buckets: vec![BucketImport {
                            title: String::new(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&*fx.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
