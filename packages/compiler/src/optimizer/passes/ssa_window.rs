//! Pass 11: the SSA window.
//!
//! Splits a unit's instructions into basic blocks, computes real dominance
//! information over the resulting CFG, and promotes this corpus's
//! "registers" (compiler-generated temporaries; user-named locals and
//! parameters stay mutable heap storage addressed by name throughout and
//! are never renamed here) into single-assignment form: every temporary
//! with more than one definition site gets a phi node placed at its
//! iterated dominance frontier, and every definition and use is rewritten
//! to a fresh, unique version. A dominator-tree-scoped value-numbering
//! pass then runs over the renamed form, so an expression computed in a
//! block is recognized as available in every block it dominates rather
//! than only within its own block. Finally the phis are deconstructed back
//! into ordinary copies inserted at each predecessor's exit, so nothing
//! downstream ever observes a `Instruction::Phi`.
//!
//! Runs only on the first fixed-point iteration and only when the block
//! count is within the safety bound, since a worst-case input could
//! otherwise blow up the phi-insertion step.

use crate::tac::{Instruction, Operand};
use crate::types::Type;
use std::collections::{HashMap, HashSet};

/// Blocks above this count skip the window entirely.
const MAX_BLOCKS_FOR_SSA: usize = 4096;

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    if instructions.is_empty() {
        return instructions;
    }
    let block_count = instructions
        .iter()
        .filter(|i| matches!(i, Instruction::Label { .. }))
        .count()
        + 1;
    if block_count > MAX_BLOCKS_FOR_SSA {
        return instructions;
    }

    let fresh = next_free_temp_id(&instructions);
    let blocks = split_into_blocks(instructions);
    let label_to_block = label_index(&blocks);
    let succ = successors(&blocks, &label_to_block);
    let preds = predecessors(&succ, blocks.len());
    let rpo = reverse_postorder(&succ);
    let idom = immediate_dominators(&preds, &rpo);
    let children = dominator_children(&idom);
    let frontiers = dominance_frontiers(&preds, &idom);
    let (defsites, types) = collect_defsites(&blocks);
    let targets: HashSet<u32> = defsites
        .iter()
        .filter(|(_, sites)| sites.len() >= 2)
        .map(|(id, _)| *id)
        .collect();

    let mut builder = SsaBuilder {
        blocks,
        succ,
        children,
        targets,
        types,
        phi_nodes: HashMap::new(),
        phi_origs: HashMap::new(),
        phi_incoming_preds: HashMap::new(),
        stacks: HashMap::new(),
        fresh,
    };
    builder.place_phis(&defsites, &frontiers);
    if idom.contains_key(&0) {
        builder.rename(0);
    }
    builder.value_number();
    builder.deconstruct();
    flatten(builder.blocks)
}

struct Block {
    label: Option<String>,
    body: Vec<Instruction>,
}

struct SsaBuilder {
    blocks: Vec<Block>,
    succ: Vec<Vec<usize>>,
    children: HashMap<usize, Vec<usize>>,
    targets: HashSet<u32>,
    types: HashMap<u32, Type>,
    /// Real phi nodes, keyed by the block they join at. Deconstructed
    /// (removed) before this pass returns.
    phi_nodes: HashMap<usize, Vec<Instruction>>,
    /// The original (pre-SSA) temporary id each `phi_nodes[block][i]` joins,
    /// same indexing as `phi_nodes`.
    phi_origs: HashMap<usize, Vec<u32>>,
    /// The predecessor block index each `incoming` entry came from, same
    /// indexing as `phi_nodes`/`phi_origs`.
    phi_incoming_preds: HashMap<usize, Vec<Vec<usize>>>,
    stacks: HashMap<u32, Vec<Operand>>,
    fresh: u32,
}

impl SsaBuilder {
    /// Classic iterated-dominance-frontier phi placement (Cytron et al.):
    /// for every block defining a target temporary, every block in its
    /// dominance frontier needs a phi, which is itself a new definition
    /// requiring the same treatment.
    fn place_phis(&mut self, defsites: &HashMap<u32, HashSet<usize>>, frontiers: &HashMap<usize, HashSet<usize>>) {
        let mut ids: Vec<u32> = self.targets.iter().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let mut has_phi: HashSet<usize> = HashSet::new();
            let mut worklist: Vec<usize> = defsites[&id].iter().copied().collect();
            worklist.sort_unstable();
            let mut on_worklist: HashSet<usize> = worklist.iter().copied().collect();
            while let Some(n) = worklist.pop() {
                let mut frontier: Vec<usize> = frontiers.get(&n).map(|s| s.iter().copied().collect()).unwrap_or_default();
                frontier.sort_unstable();
                for y in frontier {
                    if has_phi.contains(&y) {
                        continue;
                    }
                    let dest = Operand::Temporary { id: self.fresh, ty: self.types[&id].clone() };
                    self.fresh += 1;
                    self.phi_nodes.entry(y).or_default().push(Instruction::Phi { dest, incoming: Vec::new() });
                    self.phi_origs.entry(y).or_default().push(id);
                    self.phi_incoming_preds.entry(y).or_default().push(Vec::new());
                    has_phi.insert(y);
                    if !on_worklist.contains(&y) {
                        on_worklist.insert(y);
                        worklist.push(y);
                    }
                }
            }
        }
    }

    /// Dominator-tree preorder rename: versions every definition of a
    /// target temporary, rewrites every use to the version dominating it,
    /// and fills in each phi's incoming list as its predecessors finish.
    fn rename(&mut self, b: usize) {
        let mut pushed: Vec<u32> = Vec::new();

        if let Some(origs) = self.phi_origs.get(&b).cloned() {
            for (i, orig_id) in origs.iter().enumerate() {
                let dest = match &self.phi_nodes[&b][i] {
                    Instruction::Phi { dest, .. } => dest.clone(),
                    _ => unreachable!("phi_nodes only ever holds Instruction::Phi"),
                };
                self.stacks.entry(*orig_id).or_default().push(dest);
                pushed.push(*orig_id);
            }
        }

        let body = std::mem::take(&mut self.blocks[b].body);
        let mut new_body = Vec::with_capacity(body.len());
        for instr in body {
            new_body.push(rename_instruction(instr, &mut self.stacks, &self.targets, &mut self.fresh, &mut pushed));
        }
        self.blocks[b].body = new_body;

        for s in self.succ[b].clone() {
            if let Some(origs) = self.phi_origs.get(&s).cloned() {
                for (i, orig_id) in origs.iter().enumerate() {
                    let value = self
                        .stacks
                        .get(orig_id)
                        .and_then(|st| st.last())
                        .cloned()
                        .unwrap_or_else(|| Operand::Temporary { id: *orig_id, ty: self.types[orig_id].clone() });
                    if let Instruction::Phi { incoming, .. } = &mut self.phi_nodes.get_mut(&s).unwrap()[i] {
                        incoming.push((format!("__bb{}", b), value));
                    }
                    self.phi_incoming_preds.get_mut(&s).unwrap()[i].push(b);
                }
            }
        }

        if let Some(kids) = self.children.get(&b).cloned() {
            for k in kids {
                self.rename(k);
            }
        }

        for orig_id in pushed {
            if let Some(stack) = self.stacks.get_mut(&orig_id) {
                stack.pop();
            }
        }
    }

    /// Dominator-tree-scoped GVN: an expression is available to every
    /// block its defining block dominates, not just within one block.
    /// A call or write conservatively clears availability outright, same
    /// as the old intra-block version, just scoped across the whole
    /// dominated subtree instead of one block.
    fn value_number(&mut self) {
        let mut seen: HashMap<String, Operand> = HashMap::new();
        self.value_number_at(0, &mut seen);
    }

    fn value_number_at(&mut self, b: usize, seen: &mut HashMap<String, Operand>) {
        let mut inserted: Vec<String> = Vec::new();
        let body = std::mem::take(&mut self.blocks[b].body);
        let mut new_body = Vec::with_capacity(body.len());
        for instr in body {
            if let Some(key) = value_key(&instr) {
                if let Some(dest) = instr.dest() {
                    if let Some(existing) = seen.get(&key) {
                        new_body.push(Instruction::Copy { dest: dest.clone(), src: existing.clone() });
                        continue;
                    }
                    seen.insert(key.clone(), dest.clone());
                    inserted.push(key);
                }
            }
            if invalidates(&instr) {
                seen.clear();
            }
            new_body.push(instr);
        }
        self.blocks[b].body = new_body;

        if let Some(kids) = self.children.get(&b).cloned() {
            for k in kids {
                self.value_number_at(k, seen);
            }
        }

        for key in inserted {
            seen.remove(&key);
        }
    }

    /// Replace every phi with a copy inserted at each predecessor's exit.
    fn deconstruct(&mut self) {
        for b in 0..self.blocks.len() {
            let phis = match self.phi_nodes.remove(&b) {
                Some(p) => p,
                None => continue,
            };
            let pred_lists = self.phi_incoming_preds.remove(&b).unwrap_or_default();
            for (phi, preds) in phis.into_iter().zip(pred_lists) {
                if let Instruction::Phi { dest, incoming } = phi {
                    for ((_, value), pred_idx) in incoming.into_iter().zip(preds) {
                        let copy = Instruction::Copy { dest: dest.clone(), src: value };
                        insert_before_terminator(&mut self.blocks[pred_idx].body, copy);
                    }
                }
            }
        }
    }
}

fn split_into_blocks(instructions: Vec<Instruction>) -> Vec<Block> {
    let mut starts: Vec<usize> = vec![0];
    for (i, instr) in instructions.iter().enumerate() {
        if matches!(instr, Instruction::Label { .. }) && i != 0 {
            starts.push(i);
        }
        if instr.is_terminator() && i + 1 < instructions.len() {
            starts.push(i + 1);
        }
    }
    starts.sort_unstable();
    starts.dedup();

    let mut blocks = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(instructions.len());
        let slice = &instructions[start..end];
        let (label, body) = match slice.first() {
            Some(Instruction::Label { name }) => (Some(name.clone()), slice[1..].to_vec()),
            _ => (None, slice.to_vec()),
        };
        blocks.push(Block { label, body });
    }
    blocks
}

fn label_index(blocks: &[Block]) -> HashMap<String, usize> {
    blocks.iter().enumerate().filter_map(|(i, b)| b.label.clone().map(|l| (l, i))).collect()
}

fn successors(blocks: &[Block], label_to_block: &HashMap<String, usize>) -> Vec<Vec<usize>> {
    let mut succ = vec![Vec::new(); blocks.len()];
    for (i, block) in blocks.iter().enumerate() {
        match block.body.last() {
            Some(Instruction::ConditionalJump { label, .. }) => {
                if let Some(&t) = label_to_block.get(label) {
                    succ[i].push(t);
                }
                if i + 1 < blocks.len() {
                    succ[i].push(i + 1);
                }
            }
            Some(Instruction::UnconditionalJump { label }) => {
                if let Some(&t) = label_to_block.get(label) {
                    succ[i].push(t);
                }
            }
            Some(Instruction::Return { .. }) => {}
            _ => {
                if i + 1 < blocks.len() {
                    succ[i].push(i + 1);
                }
            }
        }
    }
    succ
}

fn predecessors(succ: &[Vec<usize>], len: usize) -> Vec<Vec<usize>> {
    let mut preds = vec![Vec::new(); len];
    for (b, outs) in succ.iter().enumerate() {
        for &s in outs {
            preds[s].push(b);
        }
    }
    preds
}

/// Iterative post-order DFS from block 0, reversed.
fn reverse_postorder(succ: &[Vec<usize>]) -> Vec<usize> {
    if succ.is_empty() {
        return Vec::new();
    }
    let mut visited = vec![false; succ.len()];
    let mut post = Vec::new();
    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
    visited[0] = true;
    while let Some(&mut (node, ref mut next)) = stack.last_mut() {
        if *next < succ[node].len() {
            let child = succ[node][*next];
            *next += 1;
            if !visited[child] {
                visited[child] = true;
                stack.push((child, 0));
            }
        } else {
            post.push(node);
            stack.pop();
        }
    }
    post.reverse();
    post
}

/// Cooper/Harvey/Kennedy's engineered dominator algorithm. Unreachable
/// blocks simply never gain an entry.
fn immediate_dominators(preds: &[Vec<usize>], rpo: &[usize]) -> HashMap<usize, usize> {
    let rpo_index: HashMap<usize, usize> = rpo.iter().enumerate().map(|(i, &b)| (b, i)).collect();
    let mut idom: HashMap<usize, usize> = HashMap::new();
    if rpo.is_empty() {
        return idom;
    }
    idom.insert(0, 0);
    let mut changed = true;
    while changed {
        changed = false;
        for &b in rpo.iter() {
            if b == 0 {
                continue;
            }
            let mut new_idom: Option<usize> = None;
            for &p in &preds[b] {
                if !idom.contains_key(&p) {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => p,
                    Some(cur) => intersect(cur, p, &idom, &rpo_index),
                });
            }
            if let Some(ni) = new_idom {
                if idom.get(&b) != Some(&ni) {
                    idom.insert(b, ni);
                    changed = true;
                }
            }
        }
    }
    idom
}

fn intersect(mut a: usize, mut b: usize, idom: &HashMap<usize, usize>, rpo_index: &HashMap<usize, usize>) -> usize {
    while a != b {
        while rpo_index[&a] > rpo_index[&b] {
            a = idom[&a];
        }
        while rpo_index[&b] > rpo_index[&a] {
            b = idom[&b];
        }
    }
    a
}

fn dominator_children(idom: &HashMap<usize, usize>) -> HashMap<usize, Vec<usize>> {
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut keys: Vec<usize> = idom.keys().copied().collect();
    keys.sort_unstable();
    for b in keys {
        if b == 0 {
            continue;
        }
        children.entry(idom[&b]).or_default().push(b);
    }
    children
}

fn dominance_frontiers(preds: &[Vec<usize>], idom: &HashMap<usize, usize>) -> HashMap<usize, HashSet<usize>> {
    let mut df: HashMap<usize, HashSet<usize>> = HashMap::new();
    for b in 0..preds.len() {
        df.entry(b).or_default();
    }
    for b in 0..preds.len() {
        if !idom.contains_key(&b) || preds[b].len() < 2 {
            continue;
        }
        for &p in &preds[b] {
            if !idom.contains_key(&p) {
                continue;
            }
            let mut runner = p;
            while Some(&runner) != idom.get(&b) {
                df.entry(runner).or_default().insert(b);
                let next = idom[&runner];
                if next == runner {
                    break;
                }
                runner = next;
            }
        }
    }
    df
}

fn collect_defsites(blocks: &[Block]) -> (HashMap<u32, HashSet<usize>>, HashMap<u32, Type>) {
    let mut defsites: HashMap<u32, HashSet<usize>> = HashMap::new();
    let mut types: HashMap<u32, Type> = HashMap::new();
    for (i, block) in blocks.iter().enumerate() {
        for instr in &block.body {
            if let Some(Operand::Temporary { id, ty }) = instr.dest() {
                defsites.entry(*id).or_default().insert(i);
                types.entry(*id).or_insert_with(|| ty.clone());
            }
        }
    }
    (defsites, types)
}

fn next_free_temp_id(instructions: &[Instruction]) -> u32 {
    let mut max_id: Option<u32> = None;
    for instr in instructions {
        if let Some(Operand::Temporary { id, .. }) = instr.dest() {
            max_id = Some(max_id.map_or(*id, |m| m.max(*id)));
        }
        for op in instr.operands_read() {
            if let Operand::Temporary { id, .. } = op {
                max_id = Some(max_id.map_or(*id, |m| m.max(*id)));
            }
        }
    }
    max_id.map_or(0, |m| m + 1)
}

fn rn_read(op: Operand, stacks: &HashMap<u32, Vec<Operand>>) -> Operand {
    if let Operand::Temporary { id, .. } = &op {
        if let Some(top) = stacks.get(id).and_then(|st| st.last()) {
            return top.clone();
        }
    }
    op
}

fn rn_write(op: Operand, stacks: &mut HashMap<u32, Vec<Operand>>, targets: &HashSet<u32>, fresh: &mut u32, pushed: &mut Vec<u32>) -> Operand {
    if let Operand::Temporary { id, ty } = &op {
        if targets.contains(id) {
            let new_id = *fresh;
            *fresh += 1;
            let new_op = Operand::Temporary { id: new_id, ty: ty.clone() };
            stacks.entry(*id).or_default().push(new_op.clone());
            pushed.push(*id);
            return new_op;
        }
    }
    op
}

fn rename_instruction(
    instr: Instruction,
    stacks: &mut HashMap<u32, Vec<Operand>>,
    targets: &HashSet<u32>,
    fresh: &mut u32,
    pushed: &mut Vec<u32>,
) -> Instruction {
    match instr {
        Instruction::Assignment { dest, src } => {
            let src = rn_read(src, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::Assignment { dest, src }
        }
        Instruction::Copy { dest, src } => {
            let src = rn_read(src, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::Copy { dest, src }
        }
        Instruction::BinaryOp { dest, left, op, right } => {
            let left = rn_read(left, stacks);
            let right = rn_read(right, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::BinaryOp { dest, left, op, right }
        }
        Instruction::UnaryOp { dest, op, operand } => {
            let operand = rn_read(operand, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::UnaryOp { dest, op, operand }
        }
        Instruction::Cast { dest, src } => {
            let src = rn_read(src, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::Cast { dest, src }
        }
        Instruction::ConditionalJump { cond, label } => Instruction::ConditionalJump { cond: rn_read(cond, stacks), label },
        Instruction::UnconditionalJump { label } => Instruction::UnconditionalJump { label },
        Instruction::Label { name } => Instruction::Label { name },
        Instruction::Call { dest, extern_signature, args } => {
            let args = args.into_iter().map(|a| rn_read(a, stacks)).collect();
            let dest = dest.map(|d| rn_write(d, stacks, targets, fresh, pushed));
            Instruction::Call { dest, extern_signature, args }
        }
        Instruction::MethodCall { dest, receiver, method_name, args } => {
            let receiver = rn_read(receiver, stacks);
            let args = args.into_iter().map(|a| rn_read(a, stacks)).collect();
            let dest = dest.map(|d| rn_write(d, stacks, targets, fresh, pushed));
            Instruction::MethodCall { dest, receiver, method_name, args }
        }
        Instruction::PropertyGet { dest, receiver, property } => {
            let receiver = rn_read(receiver, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::PropertyGet { dest, receiver, property }
        }
        Instruction::PropertySet { receiver, property, value } => {
            let receiver = rn_read(receiver, stacks);
            let value = rn_read(value, stacks);
            Instruction::PropertySet { receiver, property, value }
        }
        Instruction::ArrayAccess { dest, array, index } => {
            let array = rn_read(array, stacks);
            let index = rn_read(index, stacks);
            let dest = rn_write(dest, stacks, targets, fresh, pushed);
            Instruction::ArrayAccess { dest, array, index }
        }
        Instruction::ArrayAssignment { array, index, value } => {
            let array = rn_read(array, stacks);
            let index = rn_read(index, stacks);
            let value = rn_read(value, stacks);
            Instruction::ArrayAssignment { array, index, value }
        }
        Instruction::Return { value, return_var_name } => {
            Instruction::Return { value: value.map(|v| rn_read(v, stacks)), return_var_name }
        }
        // Phi placeholders are never stored in a block's body; they live in
        // `SsaBuilder::phi_nodes` until deconstruction.
        Instruction::Phi { dest, incoming } => Instruction::Phi { dest, incoming },
    }
}

fn insert_before_terminator(body: &mut Vec<Instruction>, instr: Instruction) {
    let pos = if body.last().map(Instruction::is_terminator).unwrap_or(false) { body.len() - 1 } else { body.len() };
    body.insert(pos, instr);
}

fn flatten(blocks: Vec<Block>) -> Vec<Instruction> {
    let mut out = Vec::new();
    for block in blocks {
        if let Some(label) = block.label {
            out.push(Instruction::Label { name: label });
        }
        out.extend(block.body);
    }
    out
}

fn value_key(instr: &Instruction) -> Option<String> {
    match instr {
        Instruction::BinaryOp { left, op, right, .. } => {
            Some(format!("bin:{:?}:{}:{}", op, operand_fingerprint(left), operand_fingerprint(right)))
        }
        Instruction::UnaryOp { op, operand, .. } => Some(format!("un:{:?}:{}", op, operand_fingerprint(operand))),
        _ => None,
    }
}

fn operand_fingerprint(op: &Operand) -> String {
    match op {
        Operand::Constant { value, .. } => format!("c:{:?}", value),
        Operand::Temporary { id, .. } => format!("t:{}", id),
        Operand::Variable { name, .. } => format!("v:{}", name),
        Operand::Label { name } => format!("l:{}", name),
    }
}

fn invalidates(instr: &Instruction) -> bool {
    matches!(
        instr,
        Instruction::Call { .. } | Instruction::MethodCall { .. } | Instruction::PropertySet { .. } | Instruction::ArrayAssignment { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::symbol::LiteralValue;
    use crate::types::Primitive;

    fn int_const(v: i64) -> Operand {
        Operand::Constant { value: LiteralValue::Int(v), ty: Type::Primitive(Primitive::Int32) }
    }

    fn temp(id: u32) -> Operand {
        Operand::Temporary { id, ty: Type::Primitive(Primitive::Int32) }
    }

    /// Mirrors `lower_ternary`'s join shape: both branches `Copy` into the
    /// same result temporary, which is exactly the single-assignment
    /// violation this pass exists to fix.
    #[test]
    fn ternary_style_join_gets_a_phi_then_is_fully_deconstructed() {
        let instructions = vec![
            Instruction::ConditionalJump { cond: int_const(1), label: "else".to_string() },
            Instruction::Copy { dest: temp(0), src: int_const(10) },
            Instruction::UnconditionalJump { label: "end".to_string() },
            Instruction::Label { name: "else".to_string() },
            Instruction::Copy { dest: temp(0), src: int_const(20) },
            Instruction::Label { name: "end".to_string() },
            Instruction::Return { value: Some(temp(0)), return_var_name: None },
        ];

        let out = run(instructions);

        assert!(!out.iter().any(|i| matches!(i, Instruction::Phi { .. })), "phi must be deconstructed before returning");

        // Both predecessor blocks must now copy into a single shared
        // temporary (the phi's materialized destination) before falling
        // into the join.
        let copy_dests: Vec<_> = out
            .iter()
            .filter_map(|i| match i {
                Instruction::Copy { dest: Operand::Temporary { id, .. }, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert!(copy_dests.len() >= 3, "expected both branch copies plus the phi-deconstruction copies, got {:?}", copy_dests);
    }

    #[test]
    fn redundant_computation_across_a_dominated_block_is_reused() {
        // entry computes `a + b` into t0, unconditionally falls into a
        // block that recomputes the identical expression into t1; t1's
        // definition should collapse to a copy of t0 since entry
        // dominates the second block.
        let a = Operand::Variable { name: "a".to_string(), ty: Type::Primitive(Primitive::Int32), flags: crate::tac::VariableFlags::IS_LOCAL };
        let b = Operand::Variable { name: "b".to_string(), ty: Type::Primitive(Primitive::Int32), flags: crate::tac::VariableFlags::IS_LOCAL };
        let instructions = vec![
            Instruction::BinaryOp { dest: temp(0), left: a.clone(), op: BinaryOp::Add, right: b.clone() },
            Instruction::BinaryOp { dest: temp(1), left: a, op: BinaryOp::Add, right: b },
            Instruction::Return { value: Some(temp(1)), return_var_name: None },
        ];

        let out = run(instructions);
        assert!(out.iter().any(|i| matches!(i, Instruction::Copy { dest: Operand::Temporary { id: 1, .. }, .. })));
        assert_eq!(out.iter().filter(|i| matches!(i, Instruction::BinaryOp { .. })).count(), 1);
    }

    #[test]
    fn label_integrity_holds_after_the_window_runs() {
        let instructions = vec![
            Instruction::ConditionalJump { cond: int_const(1), label: "else".to_string() },
            Instruction::Copy { dest: temp(0), src: int_const(10) },
            Instruction::UnconditionalJump { label: "end".to_string() },
            Instruction::Label { name: "else".to_string() },
            Instruction::Copy { dest: temp(0), src: int_const(20) },
            Instruction::Label { name: "end".to_string() },
            Instruction::Return { value: Some(temp(0)), return_var_name: None },
        ];
        let out = run(instructions);
        let defined: HashSet<&str> = out.iter().filter_map(Instruction::defined_label).collect();
        for target in out.iter().filter_map(Instruction::jump_target) {
            assert!(defined.contains(target), "dangling jump target {}", target);
        }
    }
}
