//! Struct, closure and lambda-info construction.

use lark_core::Value;

use crate::Context;
use crate::core::{FunctionData, LambdaInfoData, ManagedObject, NativeFn};
use crate::errors::{Result, RuntimeError};

/// Default constructor of a struct type: one argument per declared field,
/// each converted to the field's declared type.
pub(crate) fn new_struct_internal(ctx: &mut Context, f: Value, args: &[Value]) -> Result<Value> {
    let ty = ctx.function_env(f).ok_or(RuntimeError::NotCallable("constructor".into()))?;
    let types = ctx.tuple_vec(ctx.struct_field_types(ty).unwrap_or(ctx.b.null));
    check_arity(types.len(), args.len())?;
    let converter = ctx.converter.clone();
    let mut fields = Vec::with_capacity(args.len());
    for (&arg, &field_ty) in args.iter().zip(types.iter()) {
        fields.push(converter.convert(ctx, field_ty, arg)?);
    }
    Ok(ctx.new_struct(ty, &fields))
}

/// Entry point of types that have no constructor.
pub(crate) fn not_constructible(ctx: &mut Context, f: Value, _args: &[Value]) -> Result<Value> {
    let name = match ctx.function_env(f) {
        Some(ty) => ctx.type_name_str(ty),
        None => "value".to_string(),
    };
    Err(RuntimeError::NotConstructible(name))
}

pub(crate) fn check_arity(nfields: usize, nargs: usize) -> Result<()> {
    if nargs < nfields {
        Err(RuntimeError::TooFewArguments)
    } else if nargs > nfields {
        Err(RuntimeError::TooManyArguments)
    } else {
        Ok(())
    }
}

impl Context {
    /// Allocate a struct instance from already-converted field values.
    ///
    /// No arity check or conversion happens here; callers that take field
    /// values from user code go through the type's constructor closure.
    pub fn new_struct(&mut self, ty: Value, fields: &[Value]) -> Value {
        self.heap
            .alloc(ty, ManagedObject::Struct(fields.to_vec().into_boxed_slice()))
    }

    pub fn is_struct(&self, v: Value) -> bool {
        matches!(self.heap.obj(v), ManagedObject::Struct(_))
    }

    pub fn get_field(&self, v: Value, i: usize) -> Option<Value> {
        match self.heap.obj(v) {
            ManagedObject::Struct(fields) => fields.get(i).copied(),
            _ => None,
        }
    }

    pub fn get_field_by_name(&self, v: Value, name: Value) -> Result<Value> {
        let ty = self.type_of(v);
        let names = self.struct_field_names(ty).unwrap_or(self.b.null);
        let idx = self
            .tuple_elems(names)
            .and_then(|ns| ns.iter().position(|n| n.is(name)));
        match idx.and_then(|i| self.get_field(v, i)) {
            Some(field) => Ok(field),
            None => Err(RuntimeError::UnknownField {
                ty: self.show(ty),
                field: self.symbol_name(name).unwrap_or("?").to_string(),
            }),
        }
    }

    /// An expression node `Expr(head, args, type)`.
    pub fn new_expr(&mut self, head: Value, args: &[Value], ty: Value) -> Value {
        let args = self.tuple(args);
        let expr_type = self.b.expr_type;
        self.new_struct(expr_type, &[head, args, ty])
    }

    pub fn new_closure(&mut self, fptr: NativeFn, env: Option<Value>) -> Value {
        self.heap.alloc(
            self.b.any_func,
            ManagedObject::Function(Box::new(FunctionData::new(fptr, env))),
        )
    }

    pub(crate) fn function_data(&self, f: Value) -> Option<&FunctionData> {
        match self.heap.obj(f) {
            ManagedObject::Function(fd) => Some(fd),
            _ => None,
        }
    }

    pub(crate) fn function_data_mut(&mut self, f: Value) -> Option<&mut FunctionData> {
        match self.heap.obj_mut(f) {
            ManagedObject::Function(fd) => Some(fd),
            _ => None,
        }
    }

    pub fn function_env(&self, f: Value) -> Option<Value> {
        self.function_data(f).and_then(|fd| fd.env)
    }

    pub fn function_linfo(&self, f: Value) -> Option<Value> {
        self.function_data(f).and_then(|fd| fd.linfo)
    }

    pub fn new_lambda_info(&mut self, ast: Option<Value>, sparams: Value) -> Value {
        let li = LambdaInfoData {
            ast,
            sparams,
            fptr: None,
            instantiated: None,
            roots: Vec::new(),
        };
        self.heap
            .alloc(self.b.lambda_info_type, ManagedObject::LambdaInfo(Box::new(li)))
    }

    pub(crate) fn lambda_info(&self, li: Value) -> Option<&LambdaInfoData> {
        match self.heap.obj(li) {
            ManagedObject::LambdaInfo(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn lambda_info_mut(&mut self, li: Value) -> Option<&mut LambdaInfoData> {
        match self.heap.obj_mut(li) {
            ManagedObject::LambdaInfo(data) => Some(data),
            _ => None,
        }
    }

    pub fn lambda_sparams(&self, li: Value) -> Option<Value> {
        self.lambda_info(li).map(|data| data.sparams)
    }

    /// Keep `v` visible to the collector for as long as `li` is alive.
    pub fn add_root(&mut self, li: Value, v: Value) {
        if let Some(data) = self.lambda_info_mut(li) {
            if !data.roots.iter().any(|r| r.is(v)) {
                data.roots.push(v);
            }
        }
    }

    pub fn lambda_roots(&self, li: Value) -> &[Value] {
        self.lambda_info(li).map_or(&[], |data| data.roots.as_slice())
    }
}
