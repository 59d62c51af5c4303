// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

macro_rules! node_api_errors {
    ($($variant:ident, $msg:literal;)*) => {
        /// Failure of a single Node Facade operation, tagged by which
        /// operation failed.
        #[derive(Debug, Error)]
        pub enum NodeApiError {
            $(
                #[error($msg)]
                $variant(#[source] reqwest::Error),
            )*
            /// The node answered with a 2xx status but a body this crate
            /// could not deserialize into the expected shape.
            #[error("node returned an unexpected response shape: {0}")]
            UnexpectedResponse(String),
            /// The node answered with a non-2xx status.
            #[error("node returned status {status}: {body}")]
            NodeStatus { status: u16, body: String },
        }
    };
}

node_api_errors! {
    NetworkId, "failed to query network id";
    TokenBalances, "failed to query token balances";
    TransactionHistory, "failed to query transaction history";
    NativeToken, "failed to query native token info";
    TokenInfo, "failed to query token info";
    StakesForAddress, "failed to query stake positions";
    UnstakesForAddress, "failed to query unstake positions";
    Validators, "failed to query validator set";
    LookupValidator, "failed to look up validator";
    LookupTransaction, "failed to look up transaction";
    TransactionStatus, "failed to query transaction status";
    NetworkTxThroughput, "failed to query network throughput";
    NetworkTxDemand, "failed to query network demand";
    BuildTxFromIntent, "failed to build transaction from intent";
    FinalizeTx, "failed to finalize signed transaction";
    SubmitSignedTx, "failed to submit signed transaction";
}

pub type NodeApiResult<T> = Result<T, NodeApiError>;
