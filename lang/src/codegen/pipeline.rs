//! The back half of the pipeline: program -> LLVM module -> native object
//! -> linked executable.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use inkwell::context::Context;

use super::context::CodegenContext;
use crate::error::CinderError;
use crate::parser::ast::Node;

/// Drives object emission and linking for a parsed program.
pub struct Compiler {
    linker: String,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            linker: "cc".to_string(),
        }
    }

    pub fn with_linker(mut self, linker: impl Into<String>) -> Self {
        self.linker = linker.into();
        self
    }

    /// Lower the program and return the textual LLVM IR.
    pub fn emit_ir(&self, program: &Node, module_name: &str) -> Result<String, CinderError> {
        let context = Context::create();
        let mut codegen = CodegenContext::new(&context, module_name);
        codegen.compile_program(program)?;
        Ok(codegen.get_ir())
    }

    /// Lower the program and write a native object file.
    pub fn compile_to_object(
        &self,
        program: &Node,
        module_name: &str,
        path: &Path,
    ) -> Result<(), CinderError> {
        let context = Context::create();
        let mut codegen = CodegenContext::new(&context, module_name);
        codegen.compile_program(program)?;
        codegen.write_object_file(path).map_err(CinderError::codegen)
    }

    /// Compile to `<output>.o`, link with the system C compiler and remove
    /// the intermediate object whether or not the link succeeded.
    pub fn compile_to_executable(
        &self,
        program: &Node,
        module_name: &str,
        output: &Path,
    ) -> Result<(), CinderError> {
        let object_path = PathBuf::from(format!("{}.o", output.display()));

        self.compile_to_object(program, module_name, &object_path)?;
        let linked = self.link(&object_path, output);
        fs::remove_file(&object_path).ok();

        linked
    }

    fn link(&self, object: &Path, output: &Path) -> Result<(), CinderError> {
        let status = Command::new(&self.linker)
            .arg(object)
            .arg("-o")
            .arg(output)
            .status()
            .map_err(|e| CinderError::link(format!("Failed to run `{}`: {}", self.linker, e)))?;

        if !status.success() {
            return Err(CinderError::link(format!("Linking failed: {}", status)));
        }

        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
