//! Pretty-printing for IR
//!
//! Canonical, deterministic text for blocks, methods and classes. Lines
//! starting with `//` are comments; everything else is derived from the IR
//! alone, so two renderings of equal IR are byte-identical.

use super::block::BasicBlock;
use super::class::IrClass;
use super::method::IrMethod;
use super::modifier::render_attributes;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for BasicBlock {
    fn pretty_print(&self) -> String {
        let mut output = format!(
            "//<Block {} [{}], {} statements>\n",
            self.idx.as_u32(),
            self.label,
            self.statements.len()
        );
        for stmt in &self.statements {
            output.push_str(&format!("{}: {}\n", stmt.label, stmt));
        }
        output
    }
}

impl PrettyPrint for IrMethod {
    fn pretty_print(&self) -> String {
        let mut output = format!(
            "//<Method {}, {} blocks>\n",
            self.full_name(),
            self.blocks.len()
        );

        if !self.attrs.is_empty() {
            output.push_str(&render_attributes(&self.attrs));
            output.push(' ');
        }
        output.push_str(&format!(
            "{} {}({})",
            self.return_type,
            self.name,
            self.params.join(", ")
        ));
        if !self.exceptions.is_empty() {
            output.push_str(&format!(" throws {}", self.exceptions.join(", ")));
        }
        output.push_str("{\n");

        for block in &self.blocks {
            push_indented(&mut output, &block.pretty_print());
        }

        output.push_str("}\n");
        output
    }
}

impl PrettyPrint for IrClass {
    fn pretty_print(&self) -> String {
        let mut output = format!(
            "//<Class {}, {} methods>\n",
            self.name,
            self.methods.len()
        );

        if !self.attrs.is_empty() {
            output.push_str(&render_attributes(&self.attrs));
            output.push(' ');
        }
        output.push_str(&format!("class {}", self.name));
        if !self.super_class.is_empty() {
            output.push_str(&format!(" extends {}", self.super_class));
        }
        if !self.interfaces.is_empty() {
            output.push_str(&format!(" implements {}", self.interfaces.join(", ")));
        }
        output.push_str("{\n");

        for field in &self.fields {
            output.push('\t');
            if !field.attrs.is_empty() {
                output.push_str(&render_attributes(&field.attrs));
                output.push(' ');
            }
            output.push_str(&format!("{} {}\n", field.ty, field.name));
        }
        output.push('\n');

        for method in &self.methods {
            push_indented(&mut output, &method.pretty_print());
        }

        output.push_str("}\n");
        output
    }
}

/// Append `text` with one extra level of tab indentation per line
fn push_indented(output: &mut String, text: &str) {
    for line in text.lines() {
        output.push('\t');
        output.push_str(line);
        output.push('\n');
    }
}

/// Drop comment lines from rendered text
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
