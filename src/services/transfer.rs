//! Transfer service
//!
//! The one business workflow over the envelope cipher. A transfer command
//! arrives with every field enveloped; the service opens all six fields,
//! validates them, and writes a debit row for the source account and a credit
//! row for the target account in one ledger transaction. Both rows share the
//! transaction id and time, and either both are written or neither is.

use tracing::{debug, error, info};

use crate::crypto::EnvelopeCipher;
use crate::error::{ErrorCode, LedgerError, LedgerResult};
use crate::logging::mask;
use crate::models::ledger::MAX_TRANSACTION_ID_LEN;
use crate::models::{
    format_timestamp, parse_timestamp, DecryptedTransfer, EncryptedTransferCommand, LedgerEntry,
    Money, PlainTransferRequest,
};
use crate::storage::Storage;

/// Decrypted but not yet parsed command fields
struct OpenedFields {
    transaction_id: String,
    source_account: String,
    target_account: String,
    in_debt: String,
    have: String,
    time: String,
}

/// Service for encrypted transfers
pub struct TransferService<'a> {
    cipher: &'a EnvelopeCipher,
    storage: &'a Storage,
}

impl<'a> TransferService<'a> {
    pub fn new(cipher: &'a EnvelopeCipher, storage: &'a Storage) -> Self {
        Self { cipher, storage }
    }

    /// Envelope each field of a plaintext request independently
    ///
    /// Amounts and time are sealed in their canonical text forms. No
    /// validation happens here.
    pub fn encrypt_transfer_command(
        &self,
        request: &PlainTransferRequest,
    ) -> LedgerResult<EncryptedTransferCommand> {
        debug!("TRANSFER_RSA_ENCRYPT | input=????");

        Ok(EncryptedTransferCommand {
            transaction_id: self.cipher.encrypt(&request.transaction_id)?,
            source_account: self.cipher.encrypt(&request.source_account)?,
            target_account: self.cipher.encrypt(&request.target_account)?,
            encrypted_in_debt: self.cipher.encrypt(&request.in_debt.to_string())?,
            encrypted_have: self.cipher.encrypt(&request.have.to_string())?,
            time: self.cipher.encrypt(&format_timestamp(&request.time))?,
        })
    }

    /// Execute a transfer command
    ///
    /// Decrypt failures propagate with their own format or crypto kind.
    /// Unparseable values fail with `TRF_001`, business rules with
    /// `TRF_002`..`TRF_005`, and any write failure with `TRF_006`.
    pub fn transfer(&self, command: &EncryptedTransferCommand) -> LedgerResult<()> {
        self.execute(command).map_err(|err| {
            error!(
                "TRANSFER_FAILED | {}",
                mask(&format!(
                    "errorCode={} | kind={:?} | transactionId=?",
                    err.code_value(),
                    err.kind()
                ))
            );
            err
        })
    }

    /// Decrypt a command for inspection
    ///
    /// Decrypt failures are wrapped as `TRF_007`, keeping the inner kind.
    pub fn decrypt_transfer_command(
        &self,
        command: &EncryptedTransferCommand,
    ) -> LedgerResult<DecryptedTransfer> {
        let fields = self.open_fields(command).map_err(|e| {
            LedgerError::transfer_caused_by(
                ErrorCode::TransferDecryptionFailed,
                ErrorCode::TransferDecryptionFailed.default_message(),
                e,
            )
        })?;
        parse_fields(fields)
    }

    /// Ledger rows for a business transaction id
    pub fn history(&self, transaction_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        self.storage.ledger.find_by_transaction_id(transaction_id)
    }

    fn execute(&self, command: &EncryptedTransferCommand) -> LedgerResult<()> {
        let transfer = parse_fields(self.open_fields(command)?)?;

        info!(
            "TRANSFER_START | {}",
            mask("transactionId=? | sourceAccount=? | targetAccount=? | inDebt=? | have=? | time=?")
        );

        validate(&transfer)?;

        let debit = LedgerEntry::debit(
            &transfer.transaction_id,
            &transfer.source_account,
            transfer.in_debt,
            transfer.time,
        );
        let credit = LedgerEntry::credit(
            &transfer.transaction_id,
            &transfer.target_account,
            transfer.have,
            transfer.time,
        );

        self.persist(&debit, &credit).map_err(|e| {
            LedgerError::transfer_caused_by(
                ErrorCode::TransferPersistenceFailed,
                ErrorCode::TransferPersistenceFailed.default_message(),
                e,
            )
        })?;

        info!("TRANSFER_SUCCESS | {}", mask("transactionId=?"));
        Ok(())
    }

    fn persist(&self, debit: &LedgerEntry, credit: &LedgerEntry) -> LedgerResult<usize> {
        let mut txn = self.storage.ledger.begin();
        let staged = txn.insert(debit).and_then(|()| txn.insert(credit));
        if let Err(err) = staged {
            txn.rollback();
            return Err(err);
        }
        txn.commit()
    }

    fn open_fields(&self, command: &EncryptedTransferCommand) -> LedgerResult<OpenedFields> {
        Ok(OpenedFields {
            transaction_id: self.cipher.decrypt(&command.transaction_id)?,
            source_account: self.cipher.decrypt(&command.source_account)?,
            target_account: self.cipher.decrypt(&command.target_account)?,
            in_debt: self.cipher.decrypt(&command.encrypted_in_debt)?,
            have: self.cipher.decrypt(&command.encrypted_have)?,
            time: self.cipher.decrypt(&command.time)?,
        })
    }
}

fn parse_fields(fields: OpenedFields) -> LedgerResult<DecryptedTransfer> {
    let parse_money = |value: &str, field: &str| {
        Money::parse(value).map_err(|e| {
            LedgerError::Transfer {
                code: ErrorCode::TransferValidationFailed,
                detail: format!("Invalid {}: {}", field, e),
                source: None,
            }
        })
    };

    let in_debt = parse_money(&fields.in_debt, "inDebt")?;
    let have = parse_money(&fields.have, "have")?;
    let time = parse_timestamp(&fields.time).map_err(|e| LedgerError::Transfer {
        code: ErrorCode::TransferValidationFailed,
        detail: format!("Invalid time: {}", e),
        source: None,
    })?;

    Ok(DecryptedTransfer {
        transaction_id: fields.transaction_id,
        source_account: fields.source_account,
        target_account: fields.target_account,
        in_debt,
        have,
        time,
    })
}

/// Business rules, checked before anything is written
pub(crate) fn validate(transfer: &DecryptedTransfer) -> LedgerResult<()> {
    let transaction_id = transfer.transaction_id.trim();
    if transaction_id.is_empty() || transaction_id.len() > MAX_TRANSACTION_ID_LEN {
        return Err(LedgerError::Transfer {
            code: ErrorCode::TransferValidationFailed,
            detail: format!(
                "Transaction id must be 1 to {} characters",
                MAX_TRANSACTION_ID_LEN
            ),
            source: None,
        });
    }
    if transfer.source_account.trim().is_empty() {
        return Err(LedgerError::transfer(ErrorCode::TransferSourceAccountNull));
    }
    if transfer.target_account.trim().is_empty() {
        return Err(LedgerError::transfer(ErrorCode::TransferTargetAccountNull));
    }
    if transfer.source_account == transfer.target_account {
        return Err(LedgerError::transfer(ErrorCode::TransferSameAccount));
    }
    if transfer.in_debt.is_negative()
        || transfer.have.is_negative()
        || !(transfer.in_debt.is_positive() || transfer.have.is_positive())
    {
        return Err(LedgerError::transfer(ErrorCode::TransferInvalidAmount));
    }
    Ok(())
}
