//! Script compilation (TypeScript -> JavaScript).
//!
//! The rest of the crate only sees the [`ScriptCompiler`] trait. The default
//! implementation strips types with `oxc` and prints plain JavaScript.
//!
//! Scripts are evaluated as plain scripts, not modules. `import`/`export`
//! left over after type stripping is a compile error rather than output a
//! loader would choke on.
//!
//! ```text
//! source.ts --parse--> AST --semantic--> scoping --transform--> AST --codegen--> js
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{Program, Statement};
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};
use thiserror::Error;

/// Script compilation failure.
///
/// Always recoverable: callers log it and drop the script or the change.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    #[error("compiler panicked: {0}")]
    Panicked(String),
}

/// Converts script source text into executable text.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<String, CompileError>;
}

/// TypeScript transpiler backed by `oxc`.
///
/// Type annotations are erased; type-only imports and exports go with them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptCompiler;

impl TypeScriptCompiler {
    pub fn new() -> Self {
        Self
    }

    fn transpile(&self, source: &str) -> Result<String, CompileError> {
        let allocator = Allocator::default();
        let source_type = SourceType::ts();

        let ret = Parser::new(&allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            return Err(diagnostics(ret.errors));
        }
        let mut program = ret.program;

        let semantic = SemanticBuilder::new().build(&program);
        if !semantic.errors.is_empty() {
            return Err(diagnostics(semantic.errors));
        }
        let scoping = semantic.semantic.into_scoping();

        let options = TransformOptions::default();
        let ret = Transformer::new(&allocator, Path::new("script.ts"), &options)
            .build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            return Err(diagnostics(ret.errors));
        }
        if has_module_syntax(&program) {
            return Err(CompileError::Diagnostics(vec![
                "import/export is not supported, scripts run as plain scripts".to_string(),
            ]));
        }

        Ok(Codegen::new().build(&program).code)
    }
}

/// Any `import`/`export` that survived the transform.
///
/// A bare `export {}` is only a module marker and is ignored.
fn has_module_syntax(program: &Program<'_>) -> bool {
    program.body.iter().any(|stmt| match stmt {
        Statement::ExportNamedDeclaration(decl) => {
            decl.declaration.is_some() || decl.source.is_some() || !decl.specifiers.is_empty()
        }
        Statement::ImportDeclaration(_)
        | Statement::ExportAllDeclaration(_)
        | Statement::ExportDefaultDeclaration(_)
        | Statement::TSExportAssignment(_)
        | Statement::TSNamespaceExportDeclaration(_) => true,
        _ => false,
    })
}

impl ScriptCompiler for TypeScriptCompiler {
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        catch_unwind(AssertUnwindSafe(|| self.transpile(source)))
            .unwrap_or_else(|payload| Err(CompileError::Panicked(panic_message(&*payload))))
    }
}

fn diagnostics<E: std::fmt::Display>(errors: Vec<E>) -> CompileError {
    let mut messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    if messages.is_empty() {
        messages.push("parser aborted".to_string());
    }
    CompileError::Diagnostics(messages)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_type_annotations() {
        let compiler = TypeScriptCompiler::new();
        let out = compiler
            .compile("const answer: number = 42;\nlog(`${answer}`);\n")
            .unwrap();
        assert!(out.contains("const answer = 42"));
        assert!(!out.contains(": number"));
    }

    #[test]
    fn test_strips_interfaces() {
        let compiler = TypeScriptCompiler::new();
        let out = compiler
            .compile("interface Foo { a: string }\nconst x = 1;\n")
            .unwrap();
        assert!(!out.contains("interface"));
        assert!(out.contains("const x = 1"));
    }

    #[test]
    fn test_deterministic_output() {
        let compiler = TypeScriptCompiler::new();
        let source = "type Id = string;\nhook('battle', (id: Id) => log(id));\n";
        let first = compiler.compile(source).unwrap();
        let second = compiler.compile(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_module_syntax_rejected() {
        let compiler = TypeScriptCompiler::new();
        for source in [
            "export const x = 1;\n",
            "import { hook } from './api';\nhook();\n",
            "export default function () {}\n",
        ] {
            assert!(
                matches!(compiler.compile(source), Err(CompileError::Diagnostics(_))),
                "{source}"
            );
        }
    }

    #[test]
    fn test_type_only_imports_allowed() {
        let compiler = TypeScriptCompiler::new();
        let out = compiler
            .compile("import type { Id } from './types';\nconst id: Id = 'a';\nlog(id);\n")
            .unwrap();
        assert!(!out.contains("import"));
        assert!(out.contains("log(id)"));
    }

    #[test]
    fn test_syntax_error_is_diagnostic() {
        let compiler = TypeScriptCompiler::new();
        let err = compiler.compile("const = ;").unwrap_err();
        match err {
            CompileError::Diagnostics(messages) => assert!(!messages.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
    }
}
