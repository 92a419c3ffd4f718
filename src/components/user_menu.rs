// User menu in the header: a login form when signed out, the user's name
// and a logout button when signed in.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, MouseEvent};

use crate::messages::Message;
use crate::state::{dispatch_global_message, APP_STATE};

pub fn render(document: &Document) -> Result<(), JsValue> {
    let root = crate::dom_utils::get_element(document, "user-menu-root")?;
    crate::dom_utils::clear_children(&root);

    let user = APP_STATE.with(|state| state.borrow().user.clone());

    match user {
        Some(user) => {
            let name = document.create_element("span")?;
            name.set_class_name("user-name");
            name.set_text_content(Some(&user.name));
            root.append_child(&name)?;

            let logout = document.create_element("button")?;
            logout.set_class_name("user-menu-button");
            logout.set_text_content(Some("Log out"));
            root.append_child(&logout)?;

            let on_logout = Closure::wrap(Box::new(move |_: MouseEvent| {
                dispatch_global_message(Message::LogoutUser);
            }) as Box<dyn FnMut(_)>);
            logout.add_event_listener_with_callback("click", on_logout.as_ref().unchecked_ref())?;
            on_logout.forget();
        }
        None => {
            let name_input = document.create_element("input")?;
            name_input.set_id("login-name");
            name_input.set_attribute("placeholder", "Name")?;
            root.append_child(&name_input)?;

            let email_input = document.create_element("input")?;
            email_input.set_id("login-email");
            email_input.set_attribute("placeholder", "Email")?;
            root.append_child(&email_input)?;

            let login = document.create_element("button")?;
            login.set_class_name("user-menu-button");
            login.set_text_content(Some("Log in"));
            root.append_child(&login)?;

            let on_login = Closure::wrap(Box::new(move |_: MouseEvent| {
                let result = (|| -> Result<(String, String), JsValue> {
                    let document = crate::dom_utils::document()?;
                    let name = crate::dom_utils::html_input(&document, "login-name")?.value();
                    let email = crate::dom_utils::html_input(&document, "login-email")?.value();
                    Ok((name, email))
                })();
                if let Ok((name, email)) = result {
                    let name = name.trim().to_string();
                    let email = email.trim().to_string();
                    if name.is_empty() || !email.contains('@') {
                        crate::toast::error("Enter a name and a valid email");
                        return;
                    }
                    dispatch_global_message(Message::LoginUser { name, email });
                }
            }) as Box<dyn FnMut(_)>);
            login.add_event_listener_with_callback("click", on_login.as_ref().unchecked_ref())?;
            on_login.forget();
        }
    }

    Ok(())
}
