//! Builders for engine output used across integration tests

#![allow(dead_code)]

use sootir::engine::{
    RawBlock, RawBody, RawClass, RawConstant, RawField, RawMethod, RawMethodRef, RawPhiArg,
    RawUnit, RawValue, UnitId,
};

/// Incrementally builds a method body; unit ids are handed out in body order
#[derive(Default)]
pub struct BodyBuilder {
    units: Vec<RawUnit>,
    blocks: Vec<RawBlock>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit and return its handle
    pub fn unit(&mut self, kind: &str, fill: impl FnOnce(&mut RawUnit)) -> UnitId {
        // Sparse handles, so labels can't be confused with ids
        let id = UnitId(100 + 7 * self.units.len() as u32);
        let mut unit = RawUnit::new(id, kind);
        fill(&mut unit);
        self.units.push(unit);
        id
    }

    pub fn assign(&mut self, left: RawValue, right: RawValue) -> UnitId {
        self.unit("JAssignStmt", |u| {
            u.left = Some(left);
            u.right = Some(right);
        })
    }

    pub fn identity(&mut self, left: RawValue, right: RawValue) -> UnitId {
        self.unit("JIdentityStmt", |u| {
            u.left = Some(left);
            u.right = Some(right);
        })
    }

    pub fn block(&mut self, units: &[UnitId], succs: &[usize], exceptional_preds: &[usize]) {
        self.blocks.push(RawBlock {
            units: units.to_vec(),
            succs: succs.to_vec(),
            exceptional_preds: exceptional_preds.to_vec(),
        });
    }

    pub fn build(self) -> RawBody {
        RawBody {
            units: self.units,
            blocks: self.blocks,
        }
    }
}

pub fn local(name: &str, ty: &str) -> RawValue {
    let mut v = RawValue::new("JimpleLocal", ty);
    v.name = Some(name.to_string());
    v
}

pub fn int(value: i64) -> RawValue {
    let mut v = RawValue::new("IntConstant", "int");
    v.value = Some(RawConstant::Int(value));
    v
}

pub fn string(value: &str) -> RawValue {
    let mut v = RawValue::new("StringConstant", "java.lang.String");
    v.value = Some(RawConstant::Text(value.to_string()));
    v
}

pub fn param(index: u32, ty: &str) -> RawValue {
    let mut v = RawValue::new("ParameterRef", ty);
    v.param_index = Some(index);
    v
}

pub fn caught(ty: &str) -> RawValue {
    RawValue::new("JCaughtExceptionRef", ty)
}

pub fn binop(kind: &str, ty: &str, op1: RawValue, op2: RawValue) -> RawValue {
    let mut v = RawValue::new(kind, ty);
    v.op1 = Some(Box::new(op1));
    v.op2 = Some(Box::new(op2));
    v
}

pub fn phi(ty: &str, args: Vec<(RawValue, UnitId)>) -> RawValue {
    let mut v = RawValue::new("SPhiExpr", ty);
    v.phi_args = args
        .into_iter()
        .map(|(value, unit)| RawPhiArg { value, unit })
        .collect();
    v
}

pub fn method_ref(class: &str, name: &str, params: &[&str]) -> RawMethodRef {
    RawMethodRef {
        declaring_class: class.to_string(),
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn invoke(kind: &str, ty: &str, target: RawMethodRef, base: Option<RawValue>, args: Vec<RawValue>) -> RawValue {
    let mut v = RawValue::new(kind, ty);
    v.method = Some(target);
    v.base = base.map(Box::new);
    v.args = args;
    v
}

pub fn method(name: &str, params: &[&str], return_type: &str, modifiers: u32, body: Option<RawBody>) -> RawMethod {
    RawMethod {
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        return_type: return_type.to_string(),
        modifiers,
        exceptions: vec![],
        body,
    }
}

pub fn field(name: &str, ty: &str, modifiers: u32) -> RawField {
    RawField {
        name: name.to_string(),
        ty: ty.to_string(),
        modifiers,
    }
}

pub fn class(name: &str, fields: Vec<RawField>, methods: Vec<RawMethod>) -> RawClass {
    RawClass {
        name: name.to_string(),
        super_class: Some("java.lang.Object".to_string()),
        interfaces: vec![],
        modifiers: 0x1,
        application: true,
        library: false,
        java_library: false,
        phantom: false,
        fields,
        methods,
    }
}

/// Twenty blocks in a straight line, except that block 0 branches to 1 and
/// 2, and a handler at block 18 guards blocks 3-5 and 14-16.
pub fn exceptions_body() -> RawBody {
    let mut b = BodyBuilder::new();
    let mut heads = Vec::new();

    // Block 0 ends with a conditional jump to block 2's head, the fourth
    // unit added.
    let skip_target = UnitId(100 + 7 * 3);
    let entry = b.identity(local("i0", "int"), param(0, "int"));
    let branch = b.unit("JIfStmt", |u| {
        u.condition = Some(binop("JEqExpr", "boolean", local("i0", "int"), int(0)));
        u.target = Some(skip_target);
    });
    heads.push(vec![entry, branch]);

    for i in 1..20 {
        let unit = match i {
            18 => b.identity(local("r1", "java.lang.Exception"), caught("java.lang.Exception")),
            19 => b.unit("JReturnVoidStmt", |_| {}),
            _ => b.assign(local(&format!("i{}", i), "int"), int(i as i64)),
        };
        heads.push(vec![unit]);
    }
    assert_eq!(heads[2][0], skip_target);

    for (i, units) in heads.iter().enumerate() {
        let (succs, preds): (Vec<usize>, Vec<usize>) = match i {
            0 => (vec![1, 2], vec![]),
            17 => (vec![19], vec![]),
            18 => (vec![19], vec![3, 4, 5, 14, 15, 16]),
            19 => (vec![], vec![]),
            _ => (vec![i + 1], vec![]),
        };
        b.block(units, &succs, &preds);
    }
    b.build()
}

/// `x = p > 0 ? 1 : 2; return x;` in the requested dialect
pub fn diamond_body(ssa: bool) -> RawBody {
    let mut b = BodyBuilder::new();
    let i0 = || local("i0", "int");

    let u0 = b.identity(i0(), param(0, "int"));
    let else_head = UnitId(100 + 7 * 4);
    let u1 = b.unit("JIfStmt", |u| {
        u.condition = Some(binop("JLeExpr", "boolean", i0(), int(0)));
        u.target = Some(else_head);
    });
    let u2 = b.assign(local("i1", "int"), int(1));
    let join = UnitId(100 + 7 * 5);
    let u3 = b.unit("JGotoStmt", |u| u.target = Some(join));
    let u4 = if ssa {
        b.assign(local("i1_1", "int"), int(2))
    } else {
        b.assign(local("i1", "int"), int(2))
    };
    assert_eq!(u4, else_head);
    let u5 = if ssa {
        b.assign(
            local("i1_2", "int"),
            phi("int", vec![(local("i1", "int"), u3), (local("i1_1", "int"), u4)]),
        )
    } else {
        b.assign(local("i2", "int"), local("i1", "int"))
    };
    assert_eq!(u5, join);
    let u6 = b.unit("JReturnStmt", |u| {
        u.op = Some(local(if ssa { "i1_2" } else { "i2" }, "int"));
    });

    b.block(&[u0, u1], &[1, 2], &[]);
    b.block(&[u2, u3], &[3], &[]);
    b.block(&[u4], &[3], &[]);
    b.block(&[u5, u6], &[], &[]);
    b.build()
}
