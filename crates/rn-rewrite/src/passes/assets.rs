//! Pass 4: target-framework imports.
//!
//! Adds one import per need recorded by the earlier passes, skipping
//! bindings the file already has. Imports go at the top of the file after
//! any directive prologue, followed by a single explanatory comment after
//! the last import. In the app-directory convention a file that now calls
//! a router hook is also marked as a client component.

use rn_core::{FileSignals, ImportKind};
use rn_syntax::{SyntaxTree, TextEdit, extract_imports};

use super::{EditSet, Effects, Need, PassContext, PassOutput};
use crate::error::RewriteError;

/// Comment placed after the last import once imports were added.
pub const ADDED_IMPORTS_COMMENT: &str =
    "/* rr-next: imports above were added for the Next.js equivalents of react-router constructs */";

/// The client-component directive.
pub const USE_CLIENT: &str = "'use client';\n";

/// Runs the pass.
pub fn run(
    tree: &SyntaxTree,
    signals: &FileSignals,
    ctx: &PassContext<'_>,
) -> Result<PassOutput, RewriteError> {
    let mut edits = EditSet::default();
    let mut effects = Effects::default();

    let mut needs = ctx.needs;
    if !signals.unbound_images.is_empty() {
        needs.insert(Need::ImageComponent);
    }
    if needs.is_empty() {
        return Ok(PassOutput::from_parts(edits, effects));
    }

    let imports = extract_imports(tree).map_err(RewriteError::Classify)?;
    let missing: Vec<Need> = needs
        .iter()
        .filter(|need| !imports.iter().any(|i| i.binds_local(need.binding())))
        .collect();

    let prologue = Prologue::read(tree);
    let client = ctx.settings.use_directory_router
        && needs.has_hook()
        && !prologue.has_use_client;

    let mut block = String::new();
    if !missing.is_empty() {
        for need in &missing {
            block.push_str(&need.import_line(ctx.settings));
        }
        let last_import_end = imports
            .iter()
            .filter(|i| i.kind.is_static() || i.kind == ImportKind::Require)
            .map(|i| i.span.end)
            .filter(|end| *end > prologue.end)
            .max();
        match last_import_end {
            Some(end) => {
                edits.push(TextEdit::insert(end, format!("\n{ADDED_IMPORTS_COMMENT}")));
            }
            None => {
                block.push_str(ADDED_IMPORTS_COMMENT);
                block.push('\n');
            }
        }
        effects.note(format!(
            "added imports: {}",
            missing
                .iter()
                .map(|n| format!("{} from {}", n.binding(), n.module(ctx.settings)))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if client {
        effects.note("marked as a client component");
        if prologue.end == 0 {
            block.insert_str(0, USE_CLIENT);
        } else {
            edits.push(TextEdit::insert(0, USE_CLIENT));
        }
    }

    if !block.is_empty() {
        let (offset, text) = if prologue.end > 0 && !prologue.ends_with_newline(tree) {
            (prologue.end, format!("\n{block}"))
        } else {
            (prologue.insertion_point(tree), block)
        };
        edits.push(TextEdit::insert(offset, text));
    }

    Ok(PassOutput::from_parts(edits, effects))
}

/// The directive prologue (`'use strict';`, `'use client';`) of a file.
#[derive(Debug, Clone, Copy, Default)]
struct Prologue {
    /// End of the last directive statement, or 0.
    end: usize,
    has_use_client: bool,
}

impl Prologue {
    fn read(tree: &SyntaxTree) -> Self {
        let mut prologue = Self::default();
        let root = tree.root();
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if statement.kind() == "comment" {
                continue;
            }
            let directive = (statement.kind() == "expression_statement")
                .then(|| statement.named_child(0))
                .flatten()
                .filter(|e| e.kind() == "string")
                .and_then(|e| tree.string_value(e));
            let Some(directive) = directive else {
                break;
            };
            if directive == "use client" {
                prologue.has_use_client = true;
            }
            prologue.end = statement.end_byte();
        }
        prologue
    }

    fn ends_with_newline(self, tree: &SyntaxTree) -> bool {
        self.end == 0 || tree.text().get(self.end..).is_some_and(|rest| rest.starts_with('\n'))
    }

    /// Where inserted text starts: the line after the prologue, or 0.
    fn insertion_point(self, tree: &SyntaxTree) -> usize {
        if self.end == 0 {
            0
        } else if self.ends_with_newline(tree) {
            self.end + 1
        } else {
            self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{KnownBindings, classify};
    use crate::passes::NeedSet;
    use rn_core::ConversionSettings;
    use rn_syntax::{Dialect, SyntaxEngine};

    fn rewrite_with(settings: ConversionSettings, needs: &[Need], text: &str) -> String {
        let mut engine = SyntaxEngine::new().expect("engine");
        let tree = engine.parse(text, Dialect::Tsx).expect("parse");
        let signals = classify(&tree).expect("classify");
        let bindings = KnownBindings::default();
        let ctx = PassContext {
            settings: &settings,
            bindings: &bindings,
            needs: needs.iter().copied().collect::<NeedSet>(),
        };
        let output = run(&tree, &signals, &ctx).expect("pass");
        engine.apply(&tree, output.edits).expect("apply").text().to_owned()
    }

    fn rewrite(needs: &[Need], text: &str) -> String {
        rewrite_with(ConversionSettings::default(), needs, text)
    }

    #[test]
    fn test_imports_after_existing_imports() {
        let text = rewrite(
            &[Need::RouterHandle, Need::LinkComponent],
            "import React from 'react';\n\nexport default 1;\n",
        );
        assert_eq!(
            text,
            format!(
                "import {{ useRouter }} from 'next/router';\nimport Link from 'next/link';\nimport React from 'react';\n{ADDED_IMPORTS_COMMENT}\n\nexport default 1;\n"
            )
        );
    }

    #[test]
    fn test_imports_without_existing_imports() {
        let text = rewrite(&[Need::HeadWrapper], "export default 1;\n");
        assert_eq!(
            text,
            format!("import Head from 'next/head';\n{ADDED_IMPORTS_COMMENT}\nexport default 1;\n")
        );
    }

    #[test]
    fn test_existing_binding_is_not_duplicated() {
        let source = "import Link from 'next/link';\nexport default Link;\n";
        assert_eq!(rewrite(&[Need::LinkComponent], source), source);
    }

    #[test]
    fn test_unbound_image_adds_import() {
        let text = rewrite(&[], "export const A = () => <Image src=\"/a.png\" />;\n");
        assert!(text.starts_with("import Image from 'next/image';\n"));
    }

    #[test]
    fn test_app_mode_client_directive() {
        let settings = ConversionSettings {
            use_directory_router: true,
            ..ConversionSettings::default()
        };
        let text = rewrite_with(settings, &[Need::RouterHandle], "export default 1;\n");
        assert_eq!(
            text,
            format!(
                "'use client';\nimport {{ useRouter }} from 'next/navigation';\n{ADDED_IMPORTS_COMMENT}\nexport default 1;\n"
            )
        );
        assert_eq!(rewrite_with(settings, &[Need::RouterHandle], &text), text);
    }

    #[test]
    fn test_params_hooks_mark_client() {
        let settings = ConversionSettings {
            use_directory_router: true,
            ..ConversionSettings::default()
        };
        let text = rewrite_with(
            settings,
            &[Need::ParamsHook, Need::SearchParamsHook],
            "export default 1;\n",
        );
        assert_eq!(
            text,
            format!(
                "'use client';\nimport {{ useParams }} from 'next/navigation';\nimport {{ useSearchParams }} from 'next/navigation';\n{ADDED_IMPORTS_COMMENT}\nexport default 1;\n"
            )
        );
    }

    #[test]
    fn test_after_directive_prologue() {
        let text = rewrite(&[Need::LinkComponent], "'use strict';\nexport default 1;\n");
        assert_eq!(
            text,
            format!("'use strict';\nimport Link from 'next/link';\n{ADDED_IMPORTS_COMMENT}\nexport default 1;\n")
        );
    }

    #[test]
    fn test_no_needs_no_edits() {
        let source = "export default 1;\n";
        assert_eq!(rewrite(&[], source), source);
    }
}
