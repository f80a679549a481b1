//! Integration tests for Multi-Markdown table rendering

use multimd::{
    parse, parse_with_diagnostics, parse_with_options, render, render_with_diagnostics,
    render_with_options, MarkdownError, TableOptions, Token,
};
use pretty_assertions::assert_eq;

fn count(tokens: &[Token], kind: &str) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}

// ============================================================================
// HTML Rendering
// ============================================================================

mod html {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_table() {
        let src = "[Prices][tab-prices]\n\
                   | Item | Cost |\n\
                   |:-----|-----:|\n\
                   | Tea  | 3    |\n\
                   | Cake || \n\
                   \n\
                   After";

        let expected = concat!(
            "<table>\n",
            "<caption id=\"tabprices\">Prices</caption>\n",
            "<thead>\n",
            "<tr>\n",
            "<th style=\"text-align:left\">Item</th>\n",
            "<th style=\"text-align:right\">Cost</th>\n",
            "</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n",
            "<td style=\"text-align:left\">Tea</td>\n",
            "<td style=\"text-align:right\">3</td>\n",
            "</tr>\n",
            "<tr>\n",
            "<td style=\"text-align:left\" colspan=\"2\">Cake</td>\n",
            "</tr>\n",
            "</tbody>\n",
            "</table>\n",
            "<p>After</p>\n",
        );

        assert_eq!(render(src), expected);
    }

    #[test]
    fn test_headerless_with_caption() {
        let options = TableOptions {
            headerless: true,
            ..Default::default()
        };
        let html = render_with_options("[Cap]\n|---|\n| 1 |", &options);

        assert_eq!(
            html,
            "<table>\n<caption id=\"cap\">Cap</caption>\n<tbody>\n<tr>\n<td>1</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let html = render("| <b> |\n|---|\n| a&b |");
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<td>a&amp;b</td>"));
    }

    #[test]
    fn test_multiline_cell_renders_blocks() {
        let options = TableOptions {
            multiline: true,
            ..Default::default()
        };
        let html = render_with_options("| a |\n|---|\n| x \\\n| y |", &options);
        assert!(html.contains("<td>\n<p>x\n y</p>\n</td>"), "got {}", html);
    }

    #[test]
    fn test_bottom_caption() {
        let html = render("| a |\n|---|\n| 1 |\n[Totals]");
        assert!(html.starts_with(
            "<table>\n<caption id=\"totals\" style=\"caption-side: bottom\">Totals</caption>\n"
        ));
    }
}

// ============================================================================
// Table Structure
// ============================================================================

mod structure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_surrounding_paragraphs() {
        let tokens = parse("before\n| a |\n|---|\n| 1 |\n\nafter");

        assert_eq!(count(&tokens, "paragraph_open"), 2);
        assert_eq!(count(&tokens, "table_open"), 1);
        assert_eq!(tokens[0].kind, "paragraph_open");
        assert_eq!(tokens.last().map(|t| t.kind.as_str()), Some("paragraph_close"));
    }

    #[test]
    fn test_indented_separator_is_not_a_table() {
        let tokens = parse("| a |\n    |---|\n| 1 |");
        assert_eq!(count(&tokens, "table_open"), 0);
    }

    #[test]
    fn test_rowspan_chain() {
        let options: TableOptions = "rowspan".parse().unwrap();
        let tokens = parse_with_options(
            "| a | b |\n|---|---|\n| 1 | 2 |\n| ^^ | 3 |\n| ^^ | 4 |",
            &options,
        );

        let cells: Vec<&Token> = tokens.iter().filter(|t| t.kind == "td_open").collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].attr_get("rowspan"), Some("3"));
    }

    #[test]
    fn test_two_tables() {
        let tokens = parse("| a |\n|---|\n| 1 |\n\ntext\n\n| b |\n|---|\n| 2 |");

        let tables: Vec<&Token> = tokens.iter().filter(|t| t.kind == "table_open").collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].map, Some([0, 3]));
        assert_eq!(tables[1].map, Some([6, 9]));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let src = "[T]\n| a | b |\n|:-:|--+|\n| 1 || \n\n| ^^ | 2 \\\n| x | y |";
        let options = TableOptions::extended();

        assert_eq!(
            parse_with_options(src, &options),
            parse_with_options(src, &options)
        );
    }
}

// ============================================================================
// Diagnostics and Options
// ============================================================================

mod diagnostics {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_depth_limit_warning() {
        let options: TableOptions = "multiline,max-depth=0".parse().unwrap();
        let output = render_with_diagnostics("| a | b |\n|---|---|\n| x | y \\\n| z | w |", &options);

        // One warning per multi-line cell
        assert_eq!(output.warnings.len(), 2);
        assert_eq!(
            output.warnings[0].to_string(),
            "Warning at line 3: multi-line table cell exceeds the nesting limit; kept as plain text \
             (raise TableOptions::max_depth)"
        );
        assert!(output.content.contains("<td>x\nz</td>"));
    }

    #[test]
    fn test_no_warnings_for_plain_tables() {
        let (_, warnings) = parse_with_diagnostics("| a |\n|---|\n| 1 |", &TableOptions::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_invalid_option_string() {
        let err = "multiline,bogus".parse::<TableOptions>().unwrap_err();
        assert_eq!(
            err,
            MarkdownError::InvalidOption {
                option: "bogus".to_string(),
                suggestion: Some(
                    "Known options: multiline, rowspan, headerless, multibody, autolabel, max-depth=N"
                        .to_string()
                ),
            }
        );
        assert!(err.to_string().starts_with("Invalid option 'bogus'."));
    }
}
