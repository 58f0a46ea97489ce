// file: src/server/views.rs
// description: html rendering of the document list page

use crate::models::DocumentSummary;
use crate::utils::{HtmlTemplate, escape_html};
use std::collections::HashMap;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Documentos</title>
</head>
<body>
<h1>Documentos ({count})</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="pdfFile" accept="application/pdf">
<button type="submit">Subir</button>
</form>
<form action="/buscar/serial" method="get">
<input type="text" name="serial" placeholder="N° de serie">
<button type="submit">Buscar</button>
</form>
<table>
<thead><tr><th>Nombre</th><th>Páginas</th><th>Fecha</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</body>
</html>
"#;

const ROW_TEMPLATE: &str =
    r#"<tr><td><a href="/ver-pdf/{id}">{nombre}</a></td><td>{paginas}</td><td>{fecha}</td></tr>"#;

const EMPTY_ROW: &str = r#"<tr><td colspan="3">No hay documentos</td></tr>"#;

pub fn render_document_list(documents: &[DocumentSummary]) -> String {
    let row = HtmlTemplate::new(ROW_TEMPLATE);

    let rows = if documents.is_empty() {
        EMPTY_ROW.to_string()
    } else {
        documents
            .iter()
            .map(|doc| {
                let values = HashMap::from([
                    ("id", doc.id.to_string()),
                    ("nombre", escape_html(&doc.nombre)),
                    ("paginas", doc.num_paginas.to_string()),
                    ("fecha", doc.fecha_subida.format("%Y-%m-%d %H:%M").to_string()),
                ]);
                row.render(&values)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let values = HashMap::from([("count", documents.len().to_string()), ("rows", rows)]);
    HtmlTemplate::new(INDEX_TEMPLATE).render(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_rows_are_escaped() {
        let html = render_document_list(&[DocumentSummary {
            id: 3,
            nombre: "<acta>.pdf".to_string(),
            num_paginas: 2,
            fecha_subida: Utc::now(),
        }]);

        assert!(html.contains(r#"href="/ver-pdf/3""#));
        assert!(html.contains("&lt;acta&gt;.pdf"));
        assert!(html.contains("Documentos (1)"));
    }

    #[test]
    fn test_placeholder_in_name_is_not_substituted() {
        let html = render_document_list(&[DocumentSummary {
            id: 9,
            nombre: "{fecha}.pdf".to_string(),
            num_paginas: 1,
            fecha_subida: Utc::now(),
        }]);

        assert!(html.contains(r#"<a href="/ver-pdf/9">&#123;fecha&#125;.pdf</a>"#));
    }

    #[test]
    fn test_empty_list() {
        let html = render_document_list(&[]);
        assert!(html.contains("No hay documentos"));
    }
}
