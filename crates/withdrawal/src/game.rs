//! Dispute game lookup.
//!
//! Finds the earliest game of the respected type whose proposed L2 block
//! covers a withdrawal, using a binary search over the factory's game list.

use crate::WithdrawalError;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::Provider;
use binding::opstack::{
    IDisputeGameFactory::{self, GameSearchResult},
    IOptimismPortal2,
};
use eyre::WrapErr;
use std::future::Future;
use tracing::debug;

/// A game returned by `findLatestGames`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEntry {
    /// Index in the factory's game list
    pub index: u64,
    /// L2 block the game proposes an output for
    pub l2_block: u64,
    /// Proposed output root
    pub root_claim: B256,
}

impl TryFrom<GameSearchResult> for GameEntry {
    type Error = WithdrawalError;

    fn try_from(game: GameSearchResult) -> Result<Self, Self::Error> {
        // extraData starts with the proposed L2 block number as a uint256
        let l2_block = game
            .extraData
            .get(..32)
            .map(U256::from_be_slice)
            .ok_or(WithdrawalError::MalformedGame {
                index: game.index,
                len: game.extraData.len(),
            })?;

        Ok(Self {
            index: game.index.saturating_to(),
            l2_block: l2_block.saturating_to(),
            root_claim: game.rootClaim,
        })
    }
}

/// Read access to the dispute game registry.
pub trait GameRegistry: Send + Sync {
    /// Number of games ever created, of any type.
    fn game_count(&self) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Game type the portal accepts proofs against.
    fn respected_game_type(&self) -> impl Future<Output = eyre::Result<u32>> + Send;

    /// Most recent game of `game_type` at or before `index`, if any.
    fn latest_game_at(
        &self,
        game_type: u32,
        index: u64,
    ) -> impl Future<Output = eyre::Result<Option<GameEntry>>> + Send;
}

/// [`GameRegistry`] backed by the on-chain portal and factory.
#[derive(Debug, Clone)]
pub struct FactoryRegistry<P> {
    provider: P,
    portal: Address,
    factory: Address,
}

impl<P> FactoryRegistry<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, portal: Address, factory: Address) -> Self {
        Self {
            provider,
            portal,
            factory,
        }
    }
}

impl<P> GameRegistry for FactoryRegistry<P>
where
    P: Provider + Clone,
{
    async fn game_count(&self) -> eyre::Result<u64> {
        let factory = IDisputeGameFactory::new(self.factory, &self.provider);
        let count = factory
            .gameCount()
            .call()
            .await
            .wrap_err("failed to get game count")?;
        Ok(count.saturating_to())
    }

    async fn respected_game_type(&self) -> eyre::Result<u32> {
        let portal = IOptimismPortal2::new(self.portal, &self.provider);
        portal
            .respectedGameType()
            .call()
            .await
            .wrap_err("failed to get respected game type")
    }

    async fn latest_game_at(&self, game_type: u32, index: u64) -> eyre::Result<Option<GameEntry>> {
        let factory = IDisputeGameFactory::new(self.factory, &self.provider);
        let games = factory
            .findLatestGames(game_type, U256::from(index), U256::from(1))
            .call()
            .await
            .wrap_err_with(|| format!("failed to search games at index {}", index))?;

        Ok(games.into_iter().next().map(GameEntry::try_from).transpose()?)
    }
}

/// Find the earliest respected game whose L2 block is at or after `inclusion_block`.
///
/// Assumes respected games propose non-decreasing L2 blocks as the index grows.
/// An index with no game of the respected type at or before it counts as "not covering yet".
/// Costs O(log gameCount) registry reads.
pub async fn find_earliest_game<R>(registry: &R, inclusion_block: u64) -> eyre::Result<GameEntry>
where
    R: GameRegistry,
{
    let game_type = registry.respected_game_type().await?;
    let game_count = registry.game_count().await?;
    if game_count == 0 {
        return Err(WithdrawalError::NoGames.into());
    }

    debug!(game_type, game_count, inclusion_block, "Searching for earliest covering game");

    let mut lo = 0;
    let mut hi = game_count - 1;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let found = registry.latest_game_at(game_type, mid).await?;

        debug!(
            search_index = mid,
            game_index = found.map(|g| g.index),
            game_l2_block = found.map(|g| g.l2_block),
            "Checked dispute game"
        );

        match found {
            Some(game) if game.l2_block >= inclusion_block => hi = mid,
            _ => lo = mid + 1,
        }
    }

    match registry.latest_game_at(game_type, lo).await? {
        Some(game) if game.l2_block >= inclusion_block => {
            debug!(
                game_index = game.index,
                game_l2_block = game.l2_block,
                inclusion_block,
                "Found earliest covering game"
            );
            Ok(game)
        }
        _ => Err(WithdrawalError::NoQualifyingGame {
            inclusion: inclusion_block,
        }
        .into()),
    }
}
