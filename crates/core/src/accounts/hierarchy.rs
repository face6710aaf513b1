//! Chart-of-accounts hierarchy traversal.
//!
//! The chart is a forest: every account optionally points at a parent in the
//! same company. Traversal is iterative with an explicit stack and a visited
//! set, so a corrupt parent chain can never loop the walk.

use std::collections::{BTreeMap, BTreeSet};

use saldo_shared::types::{AccountCode, CompanyId};

use super::types::{Account, AccountNode};
use crate::error::LedgerError;

/// Checks that setting `parent` on `account` keeps the forest acyclic.
///
/// Walks the ancestor chain starting at the proposed parent; reaching
/// `account` (including the self-parent case) is a cycle.
pub(crate) fn ensure_acyclic(
    accounts: &BTreeMap<AccountCode, Account>,
    account: &AccountCode,
    parent: &AccountCode,
) -> Result<(), LedgerError> {
    let mut visited: BTreeSet<&AccountCode> = BTreeSet::new();
    let mut current = Some(parent);

    while let Some(code) = current {
        if code == account {
            return Err(LedgerError::CyclicParent {
                account: account.clone(),
                parent: parent.clone(),
            });
        }
        if !visited.insert(code) {
            // The chain loops without touching `account`; the walk must
            // still terminate.
            break;
        }
        current = accounts.get(code).and_then(|a| a.parent.as_ref());
    }

    Ok(())
}

/// Produces the company's chart of accounts in depth-first pre-order.
///
/// Roots and siblings appear in ascending code order; each node carries its
/// depth (0 for roots). Accounts whose parent is missing or belongs to
/// another company are listed as roots rather than dropped.
pub(crate) fn hierarchy(
    accounts: &BTreeMap<AccountCode, Account>,
    company_id: CompanyId,
) -> Vec<AccountNode> {
    // Group by parent; BTreeMap iteration keeps each child list sorted by code.
    let mut children: BTreeMap<Option<&AccountCode>, Vec<&Account>> = BTreeMap::new();
    for account in accounts.values().filter(|a| a.company_id == company_id) {
        let parent = account
            .parent
            .as_ref()
            .filter(|p| accounts.get(*p).is_some_and(|pa| pa.company_id == company_id));
        children.entry(parent).or_default().push(account);
    }

    let mut nodes = Vec::new();
    let mut visited: BTreeSet<&AccountCode> = BTreeSet::new();
    let mut stack: Vec<(&Account, usize)> = Vec::new();

    if let Some(roots) = children.get(&None) {
        // Reversed so the stack pops codes in ascending order.
        for root in roots.iter().rev() {
            stack.push((root, 0));
        }
    }

    while let Some((account, depth)) = stack.pop() {
        if !visited.insert(&account.code) {
            continue;
        }
        nodes.push(AccountNode {
            account: account.clone(),
            depth,
        });
        if let Some(kids) = children.get(&Some(&account.code)) {
            for kid in kids.iter().rev() {
                stack.push((kid, depth + 1));
            }
        }
    }

    nodes
}
