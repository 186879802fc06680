// HTML rendering of the roster table

use crate::models::Student;
use std::fmt::Write;

/// Text shown in place of rows when the roster is empty
pub const EMPTY_ROW_TEXT: &str = "No data to display";

/// Escape text for safe inclusion in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the `<tbody>` rows for a roster
///
/// Each row carries edit/delete buttons with `data-id` and `data-accion`
/// attributes for the event adapter to dispatch on.
pub fn render_rows(students: &[Student]) -> String {
    if students.is_empty() {
        return format!("<tr><td colspan=\"5\">{}</td></tr>\n", EMPTY_ROW_TEXT);
    }

    let mut html = String::new();
    for student in students {
        // Writing to a String cannot fail
        let _ = writeln!(
            html,
            "<tr>\
             <td><span class=\"badge\">{id}</span></td>\
             <td>{name}</td>\
             <td>{course}</td>\
             <td>{age}</td>\
             <td>\
             <button class=\"edit\" data-id=\"{id}\" data-accion=\"editar\">Edit</button>\
             <button class=\"delete\" data-id=\"{id}\" data-accion=\"eliminar\">Delete</button>\
             </td>\
             </tr>",
            id = student.id,
            name = escape_html(&student.name),
            course = escape_html(&student.course),
            age = student.age,
        );
    }
    html
}

/// Render the full table including its header
pub fn render_table(students: &[Student]) -> String {
    format!(
        "<table>\n\
         <thead><tr><th>ID</th><th>Name</th><th>Course</th><th>Age</th><th>Actions</th></tr></thead>\n\
         <tbody id=\"tbodyAlumnos\">\n{}</tbody>\n\
         </table>\n",
        render_rows(students)
    )
}

/// Standalone HTML page with a status line and the table
pub fn render_page(students: &[Student], status: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>Roster</title></head>\n\
         <body>\n\
         <p id=\"estadoCarga\">{}</p>\n\
         {}\
         </body>\n\
         </html>\n",
        escape_html(status),
        render_table(students)
    )
}
