// Dashboard: project list on the left, the active project's workflows on
// the right.  Re-rendered wholesale from state on every change.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MouseEvent};

use crate::messages::Message;
use crate::state::{dispatch_global_message, APP_STATE};

struct ProjectRow {
    id: String,
    name: String,
    workflow_count: usize,
    active: bool,
}

struct WorkflowRow {
    id: String,
    name: String,
    updated_at: String,
}

pub fn render(document: &Document) -> Result<(), JsValue> {
    let root = crate::dom_utils::get_element(document, "dashboard-root")?;
    crate::dom_utils::clear_children(&root);

    // Snapshot what we need, then drop the borrow before building DOM that
    // dispatches back into state.
    let (projects, active_project_name, workflows) = APP_STATE.with(|state| {
        let state = state.borrow();
        let store = &state.project_store;
        let projects: Vec<ProjectRow> = store
            .projects
            .iter()
            .map(|p| ProjectRow {
                id: p.id.clone(),
                name: p.name.clone(),
                workflow_count: p.workflows.len(),
                active: store.active_project_id.as_deref() == Some(p.id.as_str()),
            })
            .collect();
        let active = store
            .active_project_id
            .as_ref()
            .and_then(|id| store.project(id));
        let active_name = active.map(|p| p.name.clone());
        let workflows: Vec<WorkflowRow> = active
            .map(|p| {
                p.workflows
                    .iter()
                    .filter_map(|wid| store.workflows.get(wid))
                    .map(|w| WorkflowRow {
                        id: w.id.clone(),
                        name: w.name.clone(),
                        updated_at: w.updated_at.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        (projects, active_name, workflows)
    });

    render_projects_panel(document, &root, &projects)?;
    render_workflows_panel(document, &root, active_project_name.as_deref(), &workflows)?;
    Ok(())
}

fn render_projects_panel(
    document: &Document,
    root: &Element,
    projects: &[ProjectRow],
) -> Result<(), JsValue> {
    let panel = document.create_element("section")?;
    panel.set_class_name("dashboard-panel projects-panel");

    let heading = document.create_element("h2")?;
    heading.set_text_content(Some("Projects"));
    panel.append_child(&heading)?;

    // Creation row
    let form = document.create_element("div")?;
    form.set_class_name("create-row");
    let input = document.create_element("input")?;
    input.set_id("new-project-name");
    input.set_attribute("placeholder", "New project name")?;
    form.append_child(&input)?;
    let create_btn = document.create_element("button")?;
    create_btn.set_text_content(Some("Create"));
    form.append_child(&create_btn)?;
    panel.append_child(&form)?;

    let on_create = Closure::wrap(Box::new(move |_: MouseEvent| {
        let name = crate::dom_utils::document()
            .and_then(|d| crate::dom_utils::html_input(&d, "new-project-name"))
            .map(|i| i.value())
            .unwrap_or_default();
        let name = name.trim().to_string();
        if name.is_empty() {
            crate::toast::error("Project name cannot be empty");
            return;
        }
        dispatch_global_message(Message::CreateProject { name });
        crate::toast::success("Project created");
    }) as Box<dyn FnMut(_)>);
    create_btn.add_event_listener_with_callback("click", on_create.as_ref().unchecked_ref())?;
    on_create.forget();

    let list = document.create_element("ul")?;
    list.set_class_name("project-list");
    for project in projects {
        let item = document.create_element("li")?;
        item.set_class_name(if project.active {
            "project-item active"
        } else {
            "project-item"
        });

        let name = document.create_element("span")?;
        name.set_class_name("project-name");
        name.set_text_content(Some(&format!(
            "{} ({})",
            project.name, project.workflow_count
        )));
        item.append_child(&name)?;

        let project_id = project.id.clone();
        let on_select = Closure::wrap(Box::new(move |_: MouseEvent| {
            dispatch_global_message(Message::SelectProject {
                project_id: project_id.clone(),
            });
        }) as Box<dyn FnMut(_)>);
        name.add_event_listener_with_callback("click", on_select.as_ref().unchecked_ref())?;
        on_select.forget();

        let delete = document.create_element("button")?;
        delete.set_class_name("delete-button");
        delete.set_text_content(Some("Delete"));
        item.append_child(&delete)?;

        let project_id = project.id.clone();
        let on_delete = Closure::wrap(Box::new(move |_: MouseEvent| {
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message("Delete this project and all its workflows?")
                        .ok()
                })
                .unwrap_or(false);
            if confirmed {
                dispatch_global_message(Message::DeleteProject {
                    project_id: project_id.clone(),
                });
                crate::toast::success("Project deleted");
            }
        }) as Box<dyn FnMut(_)>);
        delete.add_event_listener_with_callback("click", on_delete.as_ref().unchecked_ref())?;
        on_delete.forget();

        list.append_child(&item)?;
    }
    panel.append_child(&list)?;
    root.append_child(&panel)?;
    Ok(())
}

fn render_workflows_panel(
    document: &Document,
    root: &Element,
    active_project_name: Option<&str>,
    workflows: &[WorkflowRow],
) -> Result<(), JsValue> {
    let panel = document.create_element("section")?;
    panel.set_class_name("dashboard-panel workflows-panel");

    let heading = document.create_element("h2")?;
    match active_project_name {
        Some(name) => {
            heading.set_text_content(Some(name));
            panel.append_child(&heading)?;
            build_workflow_list(document, &panel, workflows)?;
        }
        None => {
            heading.set_text_content(Some("Select a project to see its workflows"));
            panel.append_child(&heading)?;
        }
    }
    root.append_child(&panel)?;
    Ok(())
}

fn build_workflow_list(
    document: &Document,
    panel: &Element,
    workflows: &[WorkflowRow],
) -> Result<(), JsValue> {
    let form = document.create_element("div")?;
    form.set_class_name("create-row");
    let input = document.create_element("input")?;
    input.set_id("new-workflow-name");
    input.set_attribute("placeholder", "New workflow name")?;
    form.append_child(&input)?;
    let create_btn = document.create_element("button")?;
    create_btn.set_text_content(Some("Create"));
    form.append_child(&create_btn)?;
    panel.append_child(&form)?;

    let on_create = Closure::wrap(Box::new(move |_: MouseEvent| {
        let name = crate::dom_utils::document()
            .and_then(|d| crate::dom_utils::html_input(&d, "new-workflow-name"))
            .map(|i| i.value())
            .unwrap_or_default();
        let name = name.trim().to_string();
        if name.is_empty() {
            crate::toast::error("Workflow name cannot be empty");
            return;
        }
        dispatch_global_message(Message::CreateStoredWorkflow { name });
    }) as Box<dyn FnMut(_)>);
    create_btn.add_event_listener_with_callback("click", on_create.as_ref().unchecked_ref())?;
    on_create.forget();

    let list = document.create_element("ul")?;
    list.set_class_name("workflow-list");
    for workflow in workflows {
        let item = document.create_element("li")?;
        item.set_class_name("workflow-item");

        let name = document.create_element("span")?;
        name.set_class_name("workflow-name");
        name.set_text_content(Some(&workflow.name));
        name.set_attribute("title", &workflow.updated_at)?;
        item.append_child(&name)?;

        let workflow_id = workflow.id.clone();
        let on_open = Closure::wrap(Box::new(move |_: MouseEvent| {
            dispatch_global_message(Message::OpenStoredWorkflow {
                workflow_id: workflow_id.clone(),
            });
        }) as Box<dyn FnMut(_)>);
        name.add_event_listener_with_callback("click", on_open.as_ref().unchecked_ref())?;
        on_open.forget();

        let delete = document.create_element("button")?;
        delete.set_class_name("delete-button");
        delete.set_text_content(Some("Delete"));
        item.append_child(&delete)?;

        let workflow_id = workflow.id.clone();
        let on_delete = Closure::wrap(Box::new(move |_: MouseEvent| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Delete this workflow?").ok())
                .unwrap_or(false);
            if confirmed {
                dispatch_global_message(Message::DeleteStoredWorkflow {
                    workflow_id: workflow_id.clone(),
                });
                crate::toast::success("Workflow deleted");
            }
        }) as Box<dyn FnMut(_)>);
        delete.add_event_listener_with_callback("click", on_delete.as_ref().unchecked_ref())?;
        on_delete.forget();

        list.append_child(&item)?;
    }
    panel.append_child(&list)?;
    Ok(())
}
