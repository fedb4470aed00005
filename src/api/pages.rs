//! Server-rendered pages for both delivery variants.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::db::User;

/// Which of the two parallel route sets a request came through. The two
/// variants share the CRUD core and differ only in paths and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVariant {
    Basic,
    Realtime,
}

impl PageVariant {
    #[must_use]
    pub const fn list_path(self) -> &'static str {
        match self {
            Self::Basic => "/crud/basic",
            Self::Realtime => "/crud/websocket",
        }
    }

    #[must_use]
    pub fn edit_path(self, id: i32) -> String {
        match self {
            Self::Basic => format!("/crud/basic-edit/{id}"),
            Self::Realtime => format!("/crud/websocket-edit/{id}"),
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Basic => "User directory",
            Self::Realtime => "User directory (realtime)",
        }
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        body
    )
}

fn choice_select(name: &str, selected: bool, true_label: &str, false_label: &str) -> String {
    let (true_sel, false_sel) = if selected {
        (" selected", "")
    } else {
        ("", " selected")
    };
    format!(
        "<select name=\"{name}\"><option value=\"True\"{true_sel}>{true_label}</option><option value=\"False\"{false_sel}>{false_label}</option></select>"
    )
}

fn user_rows(variant: PageVariant, users: &[User]) -> String {
    let mut rows = String::new();
    for (n, user) in users.iter().enumerate() {
        let role = if user.role { "admin" } else { "regular" };
        let status = if user.status { "active" } else { "deactivated" };
        rows.push_str(&format!(
            "<tr><th>{}</th><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"{}\">edit</a>\
             <form method=\"post\" action=\"{}\" style=\"display:inline\">\
             <input type=\"hidden\" name=\"delete_user-user_id\" value=\"{}\">\
             <button type=\"submit\">delete</button></form></td></tr>\n",
            n + 1,
            encode_text(&user.username),
            encode_text(&user.email),
            role,
            status,
            variant.edit_path(user.id),
            variant.list_path(),
            user.id,
        ));
    }
    rows
}

fn notice_block(notice: Option<&str>, error: Option<&str>) -> String {
    let mut block = String::new();
    if let Some(msg) = notice {
        block.push_str(&format!("<p class=\"notice\">{}</p>\n", encode_text(msg)));
    }
    if let Some(msg) = error {
        block.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(msg)));
    }
    block
}

fn add_user_form(variant: PageVariant) -> String {
    format!(
        "<form method=\"post\" action=\"{}\">\n\
         <input name=\"add_user-username\" placeholder=\"username\">\n\
         <input name=\"add_user-email\" placeholder=\"email\">\n\
         {}\n{}\n\
         <button type=\"submit\">Add user</button>\n</form>\n",
        variant.list_path(),
        choice_select("add_user-role", false, "admin", "regular"),
        choice_select("add_user-status", true, "active", "deactivated"),
    )
}

#[must_use]
pub fn render_index() -> String {
    page(
        "roster",
        "<h1>roster</h1>\n<ul>\n\
         <li><a href=\"/crud/basic\">Page-reload variant</a></li>\n\
         <li><a href=\"/crud/websocket\">Realtime variant</a></li>\n\
         </ul>",
    )
}

#[must_use]
pub fn render_list_page(
    variant: PageVariant,
    users: &[User],
    notice: Option<&str>,
    error: Option<&str>,
) -> String {
    let realtime_note = if variant == PageVariant::Realtime {
        "<p id=\"url_show\">websocket URL: /websocket/user_refresh</p>\n"
    } else {
        ""
    };

    let body = format!(
        "<h1>{}</h1>\n{}{}\
         <table>\n<thead><tr><th>#</th><th>username</th><th>email</th><th>role</th><th>status</th><th></th></tr></thead>\n\
         <tbody id=\"users_show\">\n{}</tbody>\n</table>\n{}",
        encode_text(variant.title()),
        notice_block(notice, error),
        realtime_note,
        user_rows(variant, users),
        add_user_form(variant),
    );

    page(variant.title(), &body)
}

#[must_use]
pub fn render_edit_page(variant: PageVariant, user: &User, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Edit user {}</h1>\n{}\
         <form method=\"post\" action=\"{}\">\n\
         <input name=\"edit_user-username\" value=\"{}\">\n\
         <input name=\"edit_user-email\" value=\"{}\">\n\
         {}\n{}\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <p><a href=\"{}\">Back to list</a></p>",
        user.id,
        notice_block(None, error),
        variant.edit_path(user.id),
        encode_double_quoted_attribute(&user.username),
        encode_double_quoted_attribute(&user.email),
        choice_select("edit_user-role", user.role, "admin", "regular"),
        choice_select("edit_user-status", user.status, "active", "deactivated"),
        variant.list_path(),
    );

    page("Edit user", &body)
}
