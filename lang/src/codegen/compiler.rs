//! AST-to-LLVM lowering.
//!
//! Expressions lower to `BasicValueEnum`s, statements to side effects on the
//! module and builder. Builder calls are infallible once positioned, so
//! their `Result`s are unwrapped; every semantic failure is a
//! `CodegenError`.

use inkwell::basic_block::BasicBlock;
use inkwell::module::Linkage;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum};
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue,
};
use inkwell::{AddressSpace, FloatPredicate, IntPredicate};

use super::context::{CodegenContext, FunctionRecord};
use crate::parser::ast::{Block, If, Node, Proto};
use crate::types::{DataType, TypeInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    UnknownVariable(String),
    UnknownFunction(String),
    AssignToConstant(String),
    AssignToGlobal(String),
    NonConstantGlobal(String),
    NonConstantInitializer(String),
    TypeMismatch(String),
    InvalidOperator(String),
    InvalidLiteral(String),
    InvalidType(String),
    Internal(String),
}

impl<'ctx> CodegenContext<'ctx> {
    /// Lower a whole program into the module.
    pub fn compile_program(&mut self, program: &Node) -> Result<(), CodegenError> {
        match program {
            Node::Program { body } => {
                for stmt in body {
                    self.compile_stmt(stmt)?;
                }
                Ok(())
            }
            _ => Err(CodegenError::Internal("expected a program node".to_string())),
        }
    }

    pub fn compile_stmt(&mut self, node: &Node) -> Result<(), CodegenError> {
        match node {
            Node::VarDecl {
                name,
                ty,
                value,
                constant,
            } => self.compile_var_decl(name, ty, value, *constant),
            Node::Assign { name, value } => self.compile_assign(name, value),
            Node::Block(block) => self.compile_block(block),
            Node::FuncDecl { proto, body } => self.compile_func_decl(proto, body),
            Node::Proto(proto) => self.compile_proto(proto).map(|_| ()),
            Node::Return { value } => self.compile_return(value),
            Node::If(if_node) => self.compile_if(if_node, None),
            Node::IfElse {
                if_node,
                else_block,
            } => self.compile_if(if_node, Some(else_block)),
            // A call in statement position may be void; drop any value.
            Node::Call { callee, args } => self.compile_call(callee, args).map(|_| ()),
            Node::Program { .. } => {
                Err(CodegenError::Internal("nested program node".to_string()))
            }
            _ => self.compile_expr(node).map(|_| ()),
        }
    }

    pub fn compile_expr(&mut self, node: &Node) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        match node {
            Node::Literal { value, ty } => self.compile_literal(value, ty),
            Node::Variable { name } => self.compile_variable(name),
            Node::Binary { lhs, rhs, op } => self.compile_binary(lhs, rhs, op),
            Node::Unary { operand, op } => self.compile_unary(operand, op),
            Node::Call { callee, args } => match self.compile_call(callee, args)? {
                Some(value) => Ok(value),
                None => Err(CodegenError::TypeMismatch(format!(
                    "void function `{}` used as a value",
                    callee
                ))),
            },
            _ => Err(CodegenError::Internal(
                "statement node in expression position".to_string(),
            )),
        }
    }

    fn compile_literal(
        &mut self,
        value: &str,
        ty: &TypeInfo,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        match ty.kind {
            DataType::Integer => {
                let parsed: i32 = value.parse().map_err(|_| {
                    CodegenError::InvalidLiteral(format!("`{}` is not a valid int", value))
                })?;
                Ok(self
                    .context
                    .i32_type()
                    .const_int(parsed as u64, true)
                    .into())
            }
            DataType::Float => {
                let parsed: f32 = value.parse().map_err(|_| {
                    CodegenError::InvalidLiteral(format!("`{}` is not a valid float", value))
                })?;
                Ok(self.context.f32_type().const_float(parsed as f64).into())
            }
            DataType::Double => {
                let parsed: f64 = value.parse().map_err(|_| {
                    CodegenError::InvalidLiteral(format!("`{}` is not a valid double", value))
                })?;
                Ok(self.context.f64_type().const_float(parsed).into())
            }
            DataType::Bool => {
                let bit = (value == "true") as u64;
                Ok(self.context.bool_type().const_int(bit, false).into())
            }
            DataType::String => Ok(self.build_string_literal(value)),
            DataType::Void | DataType::Unknown => Err(CodegenError::InvalidLiteral(format!(
                "`{}` literal has no value type",
                value
            ))),
        }
    }

    /// Strings become private null-terminated byte arrays used as `i8*`.
    fn build_string_literal(&mut self, value: &str) -> BasicValueEnum<'ctx> {
        let data = self.context.const_string(value.as_bytes(), true);

        let global = self.module.add_global(data.get_type(), None, "str");
        global.set_initializer(&data);
        global.set_linkage(Linkage::Private);
        global.set_constant(true);

        let i8_ptr_type = self.context.i8_type().ptr_type(AddressSpace::default());
        global.as_pointer_value().const_cast(i8_ptr_type).into()
    }

    fn compile_var_decl(
        &mut self,
        name: &str,
        ty: &TypeInfo,
        value: &Node,
        constant: bool,
    ) -> Result<(), CodegenError> {
        let initializer = self.compile_expr(value)?;

        // Module scope: only constants, and only constant initializers.
        if self.current.is_none() {
            if !constant {
                return Err(CodegenError::NonConstantGlobal(name.to_string()));
            }
            if !is_constant_value(initializer) {
                return Err(CodegenError::NonConstantInitializer(format!(
                    "initializer of `{}`",
                    name
                )));
            }

            let llvm_type = self.map_type(ty)?;
            let global = self.module.add_global(llvm_type, None, name);
            global.set_initializer(&initializer);
            global.set_linkage(Linkage::External);
            global.set_constant(true);

            self.constants.insert(name.to_string(), initializer);
            self.globals.insert(name.to_string(), (llvm_type, global));
            return Ok(());
        }

        if constant {
            if let Some(record) = self.current.as_mut() {
                record.constants.insert(name.to_string(), initializer);
            }
            return Ok(());
        }

        let llvm_type = self.map_type(ty)?;
        let slot = self.builder.build_alloca(llvm_type, name).unwrap();
        self.builder.build_store(slot, initializer).unwrap();

        if let Some(record) = self.current.as_mut() {
            record.locals.insert(name.to_string(), (llvm_type, slot));
        }
        Ok(())
    }

    fn compile_assign(&mut self, name: &str, value: &Node) -> Result<(), CodegenError> {
        // Module-scope names are never assignable.
        if self.constants.contains_key(name) {
            return Err(CodegenError::AssignToConstant(name.to_string()));
        }
        if self.globals.contains_key(name) {
            return Err(CodegenError::AssignToGlobal(name.to_string()));
        }

        let new_value = self.compile_expr(value)?;

        match self.current.as_ref() {
            Some(record) => {
                if record.constants.contains_key(name) {
                    return Err(CodegenError::AssignToConstant(name.to_string()));
                }
                match record.locals.get(name) {
                    Some((_, slot)) => {
                        self.builder.build_store(*slot, new_value).unwrap();
                        Ok(())
                    }
                    None => Err(CodegenError::UnknownVariable(name.to_string())),
                }
            }
            None => Err(CodegenError::UnknownVariable(name.to_string())),
        }
    }

    /// Lookup order: function locals, function constants, module globals,
    /// module constants.
    fn compile_variable(&mut self, name: &str) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        if let Some(record) = self.current.as_ref() {
            if let Some((_ty, slot)) = record.locals.get(name) {
                return Ok(self.builder.build_load(*slot, name).unwrap());
            }
            if let Some(value) = record.constants.get(name) {
                return Ok(*value);
            }
            if let Some((_ty, global)) = self.globals.get(name) {
                return Ok(self
                    .builder
                    .build_load(global.as_pointer_value(), name)
                    .unwrap());
            }
        }

        if let Some(value) = self.constants.get(name) {
            return Ok(*value);
        }

        Err(CodegenError::UnknownVariable(name.to_string()))
    }

    fn compile_binary(
        &mut self,
        lhs: &Node,
        rhs: &Node,
        op: &str,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        if self.current.is_none() {
            return Err(CodegenError::NonConstantInitializer(format!(
                "binary `{}` expression",
                op
            )));
        }

        let lhs = self.compile_expr(lhs)?;
        let rhs = self.compile_expr(rhs)?;

        // Shallow check only; a full type pass is out of scope.
        if lhs.get_type() != rhs.get_type() {
            return Err(CodegenError::TypeMismatch(
                "binary operands must have the same type".to_string(),
            ));
        }

        match (lhs, rhs) {
            (BasicValueEnum::IntValue(lhs), BasicValueEnum::IntValue(rhs)) => {
                self.compile_int_binary(lhs, rhs, op)
            }
            (BasicValueEnum::FloatValue(lhs), BasicValueEnum::FloatValue(rhs)) => {
                self.compile_float_binary(lhs, rhs, op)
            }
            _ => Err(CodegenError::TypeMismatch(format!(
                "`{}` is not defined for this operand type",
                op
            ))),
        }
    }

    fn compile_int_binary(
        &mut self,
        lhs: IntValue<'ctx>,
        rhs: IntValue<'ctx>,
        op: &str,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        if (op == "and" || op == "or") && lhs.get_type().get_bit_width() != 1 {
            return Err(CodegenError::TypeMismatch(format!(
                "`{}` requires bool operands",
                op
            )));
        }

        let b = &self.builder;
        let value = match op {
            "+" => b.build_int_add(lhs, rhs, "addtmp").unwrap(),
            "-" => b.build_int_sub(lhs, rhs, "subtmp").unwrap(),
            "*" => b.build_int_mul(lhs, rhs, "multmp").unwrap(),
            "/" => b.build_int_signed_div(lhs, rhs, "divtmp").unwrap(),
            "<" => b
                .build_int_compare(IntPredicate::SLT, lhs, rhs, "cmptmp")
                .unwrap(),
            ">" => b
                .build_int_compare(IntPredicate::SGT, lhs, rhs, "cmptmp")
                .unwrap(),
            "<=" => b
                .build_int_compare(IntPredicate::SLE, lhs, rhs, "cmptmp")
                .unwrap(),
            ">=" => b
                .build_int_compare(IntPredicate::SGE, lhs, rhs, "cmptmp")
                .unwrap(),
            "==" => b
                .build_int_compare(IntPredicate::EQ, lhs, rhs, "cmptmp")
                .unwrap(),
            "!=" => b
                .build_int_compare(IntPredicate::NE, lhs, rhs, "cmptmp")
                .unwrap(),
            "and" => b.build_and(lhs, rhs, "andtmp").unwrap(),
            "or" => b.build_or(lhs, rhs, "ortmp").unwrap(),
            _ => return Err(CodegenError::InvalidOperator(op.to_string())),
        };

        Ok(value.into())
    }

    fn compile_float_binary(
        &mut self,
        lhs: FloatValue<'ctx>,
        rhs: FloatValue<'ctx>,
        op: &str,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let b = &self.builder;
        let value: BasicValueEnum<'ctx> = match op {
            "+" => b.build_float_add(lhs, rhs, "addtmp").unwrap().into(),
            "-" => b.build_float_sub(lhs, rhs, "subtmp").unwrap().into(),
            "*" => b.build_float_mul(lhs, rhs, "multmp").unwrap().into(),
            "/" => b.build_float_div(lhs, rhs, "divtmp").unwrap().into(),
            "<" => b
                .build_float_compare(FloatPredicate::OLT, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            ">" => b
                .build_float_compare(FloatPredicate::OGT, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            "<=" => b
                .build_float_compare(FloatPredicate::OLE, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            ">=" => b
                .build_float_compare(FloatPredicate::OGE, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            "==" => b
                .build_float_compare(FloatPredicate::OEQ, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            "!=" => b
                .build_float_compare(FloatPredicate::ONE, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            _ => return Err(CodegenError::InvalidOperator(op.to_string())),
        };

        Ok(value)
    }

    fn compile_unary(
        &mut self,
        operand: &Node,
        op: &str,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let value = self.compile_expr(operand)?;

        // Global initializers are folded by hand instead of emitting
        // instructions.
        if self.current.is_none() {
            return self.fold_unary(value, op);
        }

        match (op, value) {
            ("-", BasicValueEnum::IntValue(value)) => {
                Ok(self.builder.build_int_neg(value, "negtmp").unwrap().into())
            }
            ("-", BasicValueEnum::FloatValue(value)) => Ok(self
                .builder
                .build_float_neg(value, "negtmp")
                .unwrap()
                .into()),
            ("!", BasicValueEnum::IntValue(value)) => {
                Ok(self.builder.build_not(value, "nottmp").unwrap().into())
            }
            _ => Err(CodegenError::InvalidOperator(op.to_string())),
        }
    }

    fn fold_unary(
        &self,
        value: BasicValueEnum<'ctx>,
        op: &str,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        match (op, value) {
            ("-", BasicValueEnum::IntValue(value)) => match value.get_sign_extended_constant() {
                Some(n) => Ok(value
                    .get_type()
                    .const_int(n.wrapping_neg() as u64, true)
                    .into()),
                None => Err(CodegenError::NonConstantInitializer(
                    "unary `-` operand".to_string(),
                )),
            },
            ("-", BasicValueEnum::FloatValue(value)) => match value.get_constant() {
                Some((n, _)) => Ok(value.get_type().const_float(-n).into()),
                None => Err(CodegenError::NonConstantInitializer(
                    "unary `-` operand".to_string(),
                )),
            },
            ("!", BasicValueEnum::IntValue(value)) => match value.get_zero_extended_constant() {
                Some(n) => {
                    let width = value.get_type().get_bit_width();
                    let mask = if width >= 64 {
                        u64::MAX
                    } else {
                        (1u64 << width) - 1
                    };
                    Ok(value.get_type().const_int(!n & mask, false).into())
                }
                None => Err(CodegenError::NonConstantInitializer(
                    "unary `!` operand".to_string(),
                )),
            },
            _ => Err(CodegenError::InvalidOperator(op.to_string())),
        }
    }

    /// Create the function with external linkage and name its parameters.
    fn compile_proto(&mut self, proto: &Proto) -> Result<FunctionValue<'ctx>, CodegenError> {
        let mut param_types: Vec<BasicMetadataTypeEnum<'ctx>> =
            Vec::with_capacity(proto.params.len());
        for param in &proto.params {
            param_types.push(self.map_type(&param.ty)?.into());
        }

        let fn_type = match proto.ret.kind {
            DataType::Void => self.context.void_type().fn_type(&param_types, false),
            _ => self.map_type(&proto.ret)?.fn_type(&param_types, false),
        };

        let function = self
            .module
            .add_function(&proto.name, fn_type, Some(Linkage::External));

        for (argument, param) in function.get_param_iter().zip(&proto.params) {
            argument.set_name(&param.name);
        }

        Ok(function)
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CodegenError> {
        for stmt in &block.body {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_func_decl(&mut self, proto: &Proto, body: &Block) -> Result<(), CodegenError> {
        let function = self.compile_proto(proto)?;

        // Save the caller's record and insertion point across the body.
        let saved_block = self.builder.get_insert_block();
        let saved = self.current.take();

        let result = self.compile_function_body(function, proto, body);

        self.current = saved;
        if let Some(block) = saved_block {
            self.builder.position_at_end(block);
        }

        result
    }

    fn compile_function_body(
        &mut self,
        function: FunctionValue<'ctx>,
        proto: &Proto,
        body: &Block,
    ) -> Result<(), CodegenError> {
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        // Spill incoming arguments into stack slots so they behave like
        // ordinary mutable locals.
        let mut record = FunctionRecord::new(function);
        for (argument, param) in function.get_param_iter().zip(&proto.params) {
            let llvm_type = self.map_type(&param.ty)?;
            let slot = self.builder.build_alloca(llvm_type, &param.name).unwrap();
            self.builder.build_store(slot, argument).unwrap();
            record.locals.insert(param.name.clone(), (llvm_type, slot));
        }
        self.current = Some(record);

        self.compile_block(body)?;

        // A body that falls off the end still has to terminate its block.
        if let Some(block) = self.builder.get_insert_block() {
            if block.get_terminator().is_none() {
                if function.get_type().get_return_type().is_none() {
                    self.builder.build_return(None).unwrap();
                } else {
                    self.builder.build_unreachable().unwrap();
                }
            }
        }

        Ok(())
    }

    fn compile_call(
        &mut self,
        callee: &str,
        args: &[Node],
    ) -> Result<Option<BasicValueEnum<'ctx>>, CodegenError> {
        if self.current.is_none() {
            return Err(CodegenError::NonConstantInitializer(format!(
                "call to `{}`",
                callee
            )));
        }

        let function = match self.module.get_function(callee) {
            Some(function) => function,
            None => return Err(CodegenError::UnknownFunction(callee.to_string())),
        };

        let mut arguments: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.compile_expr(arg)?.into());
        }

        let site = self.builder.build_call(function, &arguments, "calltmp").unwrap();
        Ok(site.try_as_basic_value().left())
    }

    fn compile_return(&mut self, value: &Node) -> Result<(), CodegenError> {
        if self.current.is_none() {
            return Err(CodegenError::Internal(
                "return statement outside a function".to_string(),
            ));
        }

        let value = self.compile_expr(value)?;
        self.builder.build_return(Some(&value)).unwrap();
        Ok(())
    }

    /// Standard condition/branch lowering with a shared merge block.
    fn compile_if(&mut self, if_node: &If, else_block: Option<&Block>) -> Result<(), CodegenError> {
        let function = match self.current.as_ref() {
            Some(record) => record.function,
            None => {
                return Err(CodegenError::Internal(
                    "if statement outside a function".to_string(),
                ))
            }
        };

        let cond = match self.compile_expr(&if_node.cond)? {
            BasicValueEnum::IntValue(value) if value.get_type().get_bit_width() == 1 => value,
            _ => {
                return Err(CodegenError::TypeMismatch(
                    "if condition must be a bool".to_string(),
                ))
            }
        };

        let then_bb = self.context.append_basic_block(function, "then");
        let else_bb = else_block.map(|_| self.context.append_basic_block(function, "else"));
        let merge_bb = self.context.append_basic_block(function, "ifcont");

        self.builder
            .build_conditional_branch(cond, then_bb, else_bb.unwrap_or(merge_bb))
            .unwrap();

        self.builder.position_at_end(then_bb);
        self.compile_block(&if_node.block)?;
        self.branch_to_merge(merge_bb);

        if let (Some(else_bb), Some(else_body)) = (else_bb, else_block) {
            self.builder.position_at_end(else_bb);
            self.compile_block(else_body)?;
            self.branch_to_merge(merge_bb);
        }

        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn branch_to_merge(&self, merge_bb: BasicBlock<'ctx>) {
        if let Some(block) = self.builder.get_insert_block() {
            if block.get_terminator().is_none() {
                self.builder.build_unconditional_branch(merge_bb).unwrap();
            }
        }
    }

    fn map_type(&self, ty: &TypeInfo) -> Result<BasicTypeEnum<'ctx>, CodegenError> {
        match ty.kind {
            DataType::Integer => Ok(self.context.i32_type().into()),
            DataType::Float => Ok(self.context.f32_type().into()),
            DataType::Double => Ok(self.context.f64_type().into()),
            DataType::Bool => Ok(self.context.bool_type().into()),
            DataType::String => Ok(self
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .into()),
            DataType::Void | DataType::Unknown => Err(CodegenError::InvalidType(ty.name.clone())),
        }
    }
}

fn is_constant_value(value: BasicValueEnum<'_>) -> bool {
    match value {
        BasicValueEnum::IntValue(value) => value.is_const(),
        BasicValueEnum::FloatValue(value) => value.is_const(),
        BasicValueEnum::PointerValue(value) => value.is_const(),
        _ => false,
    }
}
