use std::collections::HashMap;

use super::{BasicBlock, FuncType, Function, Instruction, Predicate, Type, Value};

/// Handle to a basic block of the function under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef(usize);

/// Instruction builder for a single function.
///
/// Keeps an insertion point (the current block) and hands out uniquely
/// named registers and blocks; `finish` releases the built function.
#[derive(Debug)]
pub struct Builder {
    function: Function,
    block: usize,
    names: HashMap<String, usize>,
    next_temp: usize,
}

impl Builder {
    pub fn new(function: Function) -> Builder {
        Builder {
            function,
            block: 0,
            names: HashMap::new(),
            next_temp: 1,
        }
    }

    /// The incoming argument with the given index, as a value.
    pub fn param(&self, index: usize) -> Value {
        Value::Register {
            ty: self.function.ty.params[index].clone(),
            name: self.function.param_names[index].clone(),
        }
    }

    pub fn append_block(&mut self, name: &str) -> BlockRef {
        let name = self.unique_name(name);
        self.function.blocks.push(BasicBlock::new(name));
        BlockRef(self.function.blocks.len() - 1)
    }

    pub fn position_at_end(&mut self, block: BlockRef) {
        self.block = block.0;
    }

    pub fn current_block(&self) -> BlockRef {
        BlockRef(self.block)
    }

    pub fn block_name(&self, block: BlockRef) -> &str {
        &self.function.blocks[block.0].name
    }

    /// Whether the current block already ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.function.blocks[self.block].is_terminated()
    }

    pub fn finish(self) -> Function {
        self.function
    }

    /// Reserve `base` as a register or block name, appending `.1`, `.2`, …
    /// on collision. Blocks and registers share one namespace, as both are
    /// `%`-prefixed in the textual form.
    fn unique_name(&mut self, base: &str) -> String {
        let count = self
            .names
            .entry(base.to_owned())
            .and_modify(|count| *count += 1)
            .or_insert(0);
        let count = *count;
        if count == 0 {
            return base.to_owned();
        }
        let name = format!("{base}.{count}");
        self.names.insert(name.clone(), 0);
        name
    }

    fn temp(&mut self) -> String {
        let name = format!("t{}", self.next_temp);
        self.next_temp += 1;
        self.unique_name(&name)
    }

    fn push(&mut self, instruction: Instruction) {
        self.function.blocks[self.block].instructions.push(instruction);
    }

    pub fn alloca(&mut self, ty: Type, name: &str) -> Value {
        let result = self.unique_name(name);
        self.push(Instruction::Alloca {
            result: result.clone(),
            ty: ty.clone(),
        });
        Value::Register {
            ty: ty.ptr(),
            name: result,
        }
    }

    pub fn store(&mut self, value: Value, ptr: Value) {
        self.push(Instruction::Store { value, ptr });
    }

    pub fn load(&mut self, ptr: Value) -> Value {
        let ty = match ptr.ty() {
            Type::Ptr(pointee) => *pointee,
            other => unreachable!("load from non-pointer value of type {other}"),
        };
        let result = self.temp();
        self.push(Instruction::Load {
            result: result.clone(),
            ty: ty.clone(),
            ptr,
        });
        Value::Register { ty, name: result }
    }

    pub fn add(&mut self, lhs: Value, rhs: Value) -> Value {
        let (ty, result) = (lhs.ty(), self.temp());
        self.push(Instruction::Add {
            result: result.clone(),
            lhs,
            rhs,
        });
        Value::Register { ty, name: result }
    }

    pub fn sub(&mut self, lhs: Value, rhs: Value) -> Value {
        let (ty, result) = (lhs.ty(), self.temp());
        self.push(Instruction::Sub {
            result: result.clone(),
            lhs,
            rhs,
        });
        Value::Register { ty, name: result }
    }

    pub fn mul(&mut self, lhs: Value, rhs: Value) -> Value {
        let (ty, result) = (lhs.ty(), self.temp());
        self.push(Instruction::Mul {
            result: result.clone(),
            lhs,
            rhs,
        });
        Value::Register { ty, name: result }
    }

    pub fn sdiv(&mut self, lhs: Value, rhs: Value) -> Value {
        let (ty, result) = (lhs.ty(), self.temp());
        self.push(Instruction::Sdiv {
            result: result.clone(),
            lhs,
            rhs,
        });
        Value::Register { ty, name: result }
    }

    pub fn icmp(&mut self, pred: Predicate, lhs: Value, rhs: Value) -> Value {
        let result = self.temp();
        self.push(Instruction::Icmp {
            result: result.clone(),
            pred,
            lhs,
            rhs,
        });
        Value::Register {
            ty: Type::I1,
            name: result,
        }
    }

    pub fn gep(&mut self, base: Value, indices: Vec<Value>) -> Value {
        let pointee = match base.ty() {
            Type::Ptr(pointee) => *pointee,
            other => unreachable!("getelementptr on non-pointer value of type {other}"),
        };
        // An LLVM gep steps through the pointer with the first index and
        // through the aggregate with the remaining ones.
        let mut element = pointee.clone();
        for index in indices.iter().skip(1) {
            element = match element {
                Type::Array { elem, .. } => *elem,
                Type::Struct(mut fields) => {
                    let Value::Const { value, .. } = index else {
                        unreachable!("struct index must be constant");
                    };
                    fields.swap_remove(*value as usize)
                }
                other => unreachable!("cannot index into type {other}"),
            };
        }
        let result = self.temp();
        self.push(Instruction::GetElementPtr {
            result: result.clone(),
            pointee,
            base,
            indices,
        });
        Value::Register {
            ty: element.ptr(),
            name: result,
        }
    }

    pub fn bitcast(&mut self, value: Value, to: Type) -> Value {
        let result = self.temp();
        self.push(Instruction::Bitcast {
            result: result.clone(),
            value,
            to: to.clone(),
        });
        Value::Register {
            ty: to,
            name: result,
        }
    }

    pub fn phi(&mut self, ty: Type, incoming: Vec<(Value, BlockRef)>) -> Value {
        let incoming = incoming
            .into_iter()
            .map(|(value, block)| (value, self.block_name(block).to_owned()))
            .collect();
        let result = self.temp();
        self.push(Instruction::Phi {
            result: result.clone(),
            ty: ty.clone(),
            incoming,
        });
        Value::Register { ty, name: result }
    }

    /// Emit a call; the result is a void-typed value for void callees.
    pub fn call(&mut self, callee: &str, ty: &FuncType, args: Vec<Value>) -> Value {
        if ty.ret.is_void() {
            self.push(Instruction::Call {
                result: None,
                ty: ty.clone(),
                callee: callee.to_owned(),
                args,
            });
            return Value::Const {
                ty: Type::Void,
                value: 0,
            };
        }
        let result = self.temp();
        self.push(Instruction::Call {
            result: Some(result.clone()),
            ty: ty.clone(),
            callee: callee.to_owned(),
            args,
        });
        Value::Register {
            ty: (*ty.ret).clone(),
            name: result,
        }
    }

    pub fn branch(&mut self, dest: BlockRef) {
        let dest = self.block_name(dest).to_owned();
        self.push(Instruction::Branch { dest });
    }

    pub fn cond_branch(&mut self, cond: Value, then_dest: BlockRef, else_dest: BlockRef) {
        let then_dest = self.block_name(then_dest).to_owned();
        let else_dest = self.block_name(else_dest).to_owned();
        self.push(Instruction::CondBranch {
            cond,
            then_dest,
            else_dest,
        });
    }

    pub fn switch(&mut self, value: Value, default: BlockRef, cases: Vec<(Value, BlockRef)>) {
        let default = self.block_name(default).to_owned();
        let cases = cases
            .into_iter()
            .map(|(case, block)| (case, self.block_name(block).to_owned()))
            .collect();
        self.push(Instruction::Switch {
            value,
            default,
            cases,
        });
    }

    pub fn ret(&mut self, value: Option<Value>) {
        self.push(Instruction::Ret { value });
    }

    pub fn unreachable(&mut self) {
        self.push(Instruction::Unreachable);
    }
}

#[cfg(test)]
mod tests {
    use super::{Builder, FuncType, Function, Type};

    fn empty_function() -> Function {
        Function {
            name: "f".to_owned(),
            ty: FuncType {
                ret: Box::new(Type::I32),
                params: vec![],
                vararg: false,
            },
            param_names: vec![],
            blocks: vec![],
        }
    }

    #[test]
    fn block_names_are_uniquified() {
        let mut builder = Builder::new(empty_function());
        let entry = builder.append_block("entry");
        let dead = builder.append_block("dead");
        let dead_again = builder.append_block("dead");

        assert_eq!(builder.block_name(entry), "entry");
        assert_eq!(builder.block_name(dead), "dead");
        assert_eq!(builder.block_name(dead_again), "dead.1");
    }

    #[test]
    fn terminator_tracking() {
        let mut builder = Builder::new(empty_function());
        let entry = builder.append_block("entry");
        builder.position_at_end(entry);
        assert!(!builder.is_terminated());

        builder.ret(Some(super::Value::Const {
            ty: Type::I32,
            value: 0,
        }));
        assert!(builder.is_terminated());
    }

    #[test]
    fn registers_avoid_named_slots() {
        let mut builder = Builder::new(empty_function());
        let entry = builder.append_block("entry");
        builder.position_at_end(entry);

        let slot = builder.alloca(Type::I32, "t1");
        assert_eq!(slot.to_string(), "%t1");

        // The first temporary would also be named t1; it must not collide.
        let loaded = builder.load(slot);
        assert_eq!(loaded.to_string(), "%t1.1");
    }
}
