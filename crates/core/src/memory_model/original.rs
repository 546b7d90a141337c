//! The model of Manson, Pugh and Adve (POPL 2005).

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, iff, implies, not, or};

use super::{
    MemoryModel, ModelKind, RoundContext, external_predecessors_committed,
    writes_seen_committed,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OriginalModel;

impl MemoryModel for OriginalModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Original
    }

    fn hb_agreement(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let p = ctx.program;
        let cur = ctx.current();
        let mut parts = Vec::new();
        for a in p.ids() {
            for b in p.ids() {
                if a == b || !p.hb_possible(a, b) {
                    continue;
                }
                parts.push(implies(
                    and(vec![ctx.committed(a), ctx.committed(b)]),
                    iff(cur.hb(a, b), ctx.main.hb(a, b)),
                ));
            }
        }
        and(parts)
    }

    fn so_agreement(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let sync = ctx.program.sync_actions();
        let cur = ctx.current();
        let mut parts = Vec::new();
        for (i, &a) in sync.iter().enumerate() {
            for &b in &sync[i + 1..] {
                parts.push(implies(
                    and(vec![ctx.committed(a), ctx.committed(b)]),
                    iff(cur.so_before(a, b), ctx.main.so_before(a, b)),
                ));
            }
        }
        and(parts)
    }

    fn new_reads_see_committed(&self, ctx: &RoundContext<'_, '_>) -> Term {
        writes_seen_committed(ctx, true)
    }

    fn sufficient_sync(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let p = ctx.program;
        let cur = ctx.current();
        let mut parts = Vec::new();
        for &(x, y) in p.sw_candidates() {
            if p.po(x, y) {
                continue;
            }
            // sw edge of E_i with no hb path around it
            let bypass = or(p
                .ids()
                .filter(|&c| c != x && c != y)
                .map(|c| and(vec![cur.hb(x, c), cur.hb(c, y)])));
            let ssw = and(vec![cur.sw(x, y), not(bypass)]);
            let enables_commit = or(p
                .ids()
                .map(|z| and(vec![cur.hb_reflexive(y, z), ctx.newly_committed(z)])));
            let persists = and(ctx.later_rounds().iter().map(|e| e.sw(x, y)));
            parts.push(implies(and(vec![ssw, enables_commit]), persists));
        }
        and(parts)
    }

    fn external_actions(&self, ctx: &RoundContext<'_, '_>) -> Term {
        external_predecessors_committed(ctx, ctx.current())
    }
}
