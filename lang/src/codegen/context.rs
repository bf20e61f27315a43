use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::targets::{
    CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine,
};
use inkwell::types::BasicTypeEnum;
use inkwell::values::{BasicValueEnum, FunctionValue, GlobalValue, PointerValue};
use inkwell::{AddressSpace, OptimizationLevel};
use std::collections::HashMap;
use std::path::Path;

/// Emission state for the function currently being lowered.
///
/// Locals are entry-block stack slots; constants are function-scope values
/// registered without an allocation.
pub struct FunctionRecord<'ctx> {
    pub function: FunctionValue<'ctx>,
    pub locals: HashMap<String, (BasicTypeEnum<'ctx>, PointerValue<'ctx>)>,
    pub constants: HashMap<String, BasicValueEnum<'ctx>>,
}

impl<'ctx> FunctionRecord<'ctx> {
    pub fn new(function: FunctionValue<'ctx>) -> Self {
        Self {
            function,
            locals: HashMap::new(),
            constants: HashMap::new(),
        }
    }
}

/// Owns the LLVM module and builder plus the two-tier symbol tables.
///
/// Name lookup consults the current function record first, then module
/// scope. The record lives only while a `FuncDecl` is being lowered.
pub struct CodegenContext<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub(crate) globals: HashMap<String, (BasicTypeEnum<'ctx>, GlobalValue<'ctx>)>,
    pub(crate) constants: HashMap<String, BasicValueEnum<'ctx>>,
    pub(crate) current: Option<FunctionRecord<'ctx>>,
}

impl<'ctx> CodegenContext<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();

        // printf(i8*, ...) -> i32, resolved by the C library at link time.
        let i8_ptr_type = context.i8_type().ptr_type(AddressSpace::default());
        let printf_type = context.i32_type().fn_type(&[i8_ptr_type.into()], true);
        module.add_function("printf", printf_type, Some(Linkage::External));

        let bool_type = context.bool_type();
        let mut constants: HashMap<String, BasicValueEnum<'ctx>> = HashMap::new();
        constants.insert("true".to_string(), bool_type.const_int(1, false).into());
        constants.insert("false".to_string(), bool_type.const_int(0, false).into());

        Self {
            context,
            module,
            builder,
            globals: HashMap::new(),
            constants,
            current: None,
        }
    }

    /// The textual LLVM IR of the module.
    pub fn get_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Write the module as a native object file.
    pub fn write_object_file(&self, path: &Path) -> Result<(), String> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|e| format!("Failed to initialize native target: {}", e))?;

        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple)
            .map_err(|e| format!("Failed to get target from triple: {}", e))?;

        let target_machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| "Failed to create target machine".to_string())?;

        target_machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| format!("Failed to write object file: {}", e))
    }
}
