//! Solution cell stripping.
//!
//! Instructor solution cells are marked by a magic comment on their first
//! line. Stripping removes the solution source from the student-facing copy
//! while keeping any figures the solution produced: each image output is
//! pulled out as a named binary artifact and the cell is rewritten as a
//! markdown stub linking to it.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::notebook::{Notebook, SourceText};

/// Marker prefix identifying a solution cell, compared against the cell
/// source after whitespace removal and lowercasing.
///
/// Course authoring templates write this as `# @title Solution`; the
/// normalized literal below is the contract and must not be generalized.
pub const SOLUTION_MARKER: &str = "#@titlesolution";

/// Placeholder directory token used in generated `<img>` paths.
///
/// The stripping pass does not know where the student notebook will live
/// relative to the static-files directory; the orchestrator substitutes the
/// real path with [`resolve_static_dir`].
pub const STATIC_DIR_TOKEN: &str = "{static_dir}";

/// Whether the source text marks a solution cell.
pub fn is_solution_source(source: &SourceText) -> bool {
    let normalized: String = source
        .text()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    normalized.starts_with(SOLUTION_MARKER)
}

/// Remove solution cells from the notebook, extracting their images.
///
/// `key` seeds the artifact names (callers pass the notebook's file stem).
/// Marked cells without outputs are dropped; marked cells with outputs
/// become markdown stubs pointing at the extracted images. All other cells
/// pass through untouched. Returns the artifact name → bytes map; names
/// follow `{key}_Solution_{cell_index}_{output_index}{ext}` with
/// `cell_index` taken from the original document order.
pub fn strip_solutions(
    notebook: &mut Notebook,
    key: &str,
) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut resources = BTreeMap::new();
    let mut kept = Vec::with_capacity(notebook.cells.len());
    let mut stripped = 0usize;

    for (cell_index, mut cell) in notebook.cells.drain(..).enumerate() {
        if !is_solution_source(&cell.source) {
            kept.push(cell);
            continue;
        }

        stripped += 1;

        if !cell.has_outputs() {
            tracing::debug!("Dropping output-less solution cell {}", cell_index);
            continue;
        }

        let mut names = Vec::new();
        for (output_index, output) in cell.outputs.iter().flatten().enumerate() {
            if let Some(artifact) = output.image_artifact()? {
                let name = format!(
                    "{key}_Solution_{cell_index}_{output_index}{}",
                    artifact.extension
                );
                names.push(name.clone());
                resources.insert(name, artifact.bytes);
            }
        }

        cell.source = example_output_stub(&names).into();
        cell.cell_type = "markdown".to_string();
        cell.outputs = None;
        cell.execution_count = None;
        kept.push(cell);
    }

    notebook.cells = kept;

    tracing::info!(
        "Stripped {} solution cells, extracted {} images",
        stripped,
        resources.len()
    );

    Ok(resources)
}

/// Substitute the placeholder directory token with the real static path.
pub fn resolve_static_dir(notebook: &mut Notebook, static_dir: &str) {
    for cell in &mut notebook.cells {
        match &mut cell.source {
            SourceText::Text(text) => {
                if text.contains(STATIC_DIR_TOKEN) {
                    *text = text.replace(STATIC_DIR_TOKEN, static_dir);
                }
            }
            SourceText::Lines(lines) => {
                for line in lines.iter_mut() {
                    if line.contains(STATIC_DIR_TOKEN) {
                        *line = line.replace(STATIC_DIR_TOKEN, static_dir);
                    }
                }
            }
        }
    }
}

/// Build the markdown stub replacing a solution cell's source.
fn example_output_stub(names: &[String]) -> String {
    let mut stub = String::from("**Example output:**\n");
    for name in names {
        stub.push_str(&format!("\n<img src='{STATIC_DIR_TOKEN}/{name}'>\n"));
    }
    stub
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;
    use crate::outputs::{CellOutput, OutputData};

    fn notebook_with(cells: Vec<Cell>) -> Notebook {
        Notebook {
            metadata: serde_json::json!({}),
            nbformat: 4,
            nbformat_minor: 5,
            cells,
            extra: serde_json::Map::new(),
        }
    }

    fn code_cell(source: &str, outputs: Vec<CellOutput>) -> Cell {
        Cell {
            cell_type: "code".to_string(),
            metadata: serde_json::json!({}),
            source: SourceText::Text(source.to_string()),
            outputs: Some(outputs),
            execution_count: Some(1),
            extra: serde_json::Map::new(),
        }
    }

    fn png_output() -> CellOutput {
        use base64::Engine;
        CellOutput::DisplayData {
            data: OutputData {
                image_png: Some(SourceText::Text(
                    base64::engine::general_purpose::STANDARD.encode(b"png bytes"),
                )),
                ..Default::default()
            },
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn test_marker_detection() {
        let marked = |s: &str| is_solution_source(&SourceText::Text(s.to_string()));

        assert!(marked("# @title Solution\nanswer = 42"));
        assert!(marked("#@titlesolution"));
        assert!(marked("#  @TITLE   SOLUTION to exercise 3"));
        assert!(marked("\n# @title Solution")); // leading blank line
        assert!(!marked("# Solution discussed below"));
        assert!(!marked("x = 1  # @title Solution"));
        assert!(!marked(""));
    }

    #[test]
    fn test_unmarked_cells_untouched() {
        let mut nb = notebook_with(vec![code_cell("x = 1", vec![png_output()])]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert!(resources.is_empty());
        assert_eq!(nb.cells.len(), 1);
        assert_eq!(nb.cells[0].cell_type, "code");
        assert_eq!(nb.cells[0].source.text(), "x = 1");
        assert!(nb.cells[0].has_outputs());
        assert_eq!(nb.cells[0].execution_count, Some(1));
    }

    #[test]
    fn test_output_less_solution_cell_removed() {
        let mut nb = notebook_with(vec![
            code_cell("x = 1", vec![]),
            code_cell("# @title Solution\nanswer = 42", vec![]),
        ]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert!(resources.is_empty());
        assert_eq!(nb.cells.len(), 1);
        assert_eq!(nb.cells[0].source.text(), "x = 1");
    }

    #[test]
    fn test_solution_cell_with_image_becomes_stub() {
        let mut nb = notebook_with(vec![
            code_cell("x = 1", vec![]),
            code_cell("# @title Solution\nplot()", vec![png_output()]),
        ]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert_eq!(resources.len(), 1);
        assert!(resources.contains_key("W1D1_Solution_1_0.png"));

        let cell = &nb.cells[1];
        assert_eq!(cell.cell_type, "markdown");
        assert!(cell.outputs.is_none());
        assert!(cell.execution_count.is_none());

        let source = cell.source.text();
        assert!(source.starts_with("**Example output:**"));
        assert_eq!(source.matches("<img").count(), 1);
        assert!(source.contains("{static_dir}/W1D1_Solution_1_0.png"));
    }

    #[test]
    fn test_one_img_tag_per_output_in_order() {
        let mut nb = notebook_with(vec![code_cell(
            "# @title Solution",
            vec![png_output(), png_output()],
        )]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert_eq!(resources.len(), 2);
        let source = nb.cells[0].source.text();
        let first = source.find("W1D1_Solution_0_0.png").unwrap();
        let second = source.find("W1D1_Solution_0_1.png").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_artifact_names_unique_across_cells() {
        let mut nb = notebook_with(vec![
            code_cell("# @title Solution", vec![png_output()]),
            code_cell("x = 1", vec![]),
            code_cell("# @title Solution", vec![png_output()]),
        ]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        let names: Vec<&String> = resources.keys().collect();
        assert_eq!(names.len(), 2);
        assert!(resources.contains_key("W1D1_Solution_0_0.png"));
        assert!(resources.contains_key("W1D1_Solution_2_0.png"));
    }

    #[test]
    fn test_solution_cell_with_text_only_output_keeps_stub_without_images() {
        let output = CellOutput::Stream {
            name: "stdout".to_string(),
            text: SourceText::Text("computed 42\n".to_string()),
        };
        let mut nb = notebook_with(vec![code_cell("# @title Solution", vec![output])]);
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert!(resources.is_empty());
        assert_eq!(nb.cells.len(), 1);
        assert_eq!(nb.cells[0].cell_type, "markdown");
        assert_eq!(nb.cells[0].source.text().matches("<img").count(), 0);
    }

    #[test]
    fn test_resolve_static_dir() {
        let mut nb = notebook_with(vec![code_cell("# @title Solution", vec![png_output()])]);
        strip_solutions(&mut nb, "W1D1").unwrap();
        resolve_static_dir(&mut nb, "../static");

        let source = nb.cells[0].source.text();
        assert!(source.contains("<img src='../static/W1D1_Solution_0_0.png'>"));
        assert!(!source.contains(STATIC_DIR_TOKEN));
    }

    #[test]
    fn test_stripping_idempotent() {
        let mut nb = notebook_with(vec![
            code_cell("x = 1", vec![]),
            code_cell("# @title Solution", vec![png_output()]),
        ]);
        strip_solutions(&mut nb, "W1D1").unwrap();

        let snapshot = serde_json::to_string(&nb).unwrap();
        let resources = strip_solutions(&mut nb, "W1D1").unwrap();

        assert!(resources.is_empty());
        assert_eq!(serde_json::to_string(&nb).unwrap(), snapshot);
    }
}
