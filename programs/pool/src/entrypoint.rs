//! Pool program entrypoint

use pinocchio::{account_info::AccountInfo, msg, pubkey::Pubkey, ProgramResult};
use pool_common::PoolError;

use crate::instructions::*;
use crate::venue::UNDELEGATE_CALLBACK_DISCRIMINATOR;

#[cfg(feature = "bpf-entrypoint")]
pinocchio::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    // The delegation program calls back with its own 8-byte discriminator
    if instruction_data.starts_with(&UNDELEGATE_CALLBACK_DISCRIMINATOR) {
        msg!("Instruction: UndelegateCallback");
        return process_undelegation_callback(program_id, accounts, instruction_data);
    }

    let Some((&discriminator, data)) = instruction_data.split_first() else {
        msg!("Error: Instruction data is empty");
        return Err(PoolError::InvalidInstruction.into());
    };
    let Some(instruction) = PoolInstruction::from_u8(discriminator) else {
        msg!("Error: Unknown instruction");
        return Err(PoolError::InvalidInstruction.into());
    };

    match instruction {
        PoolInstruction::InitializePool => {
            msg!("Instruction: InitializePool");
            process_initialize_pool(program_id, accounts, data)
        }
        PoolInstruction::InitializeProvider => {
            msg!("Instruction: InitializeProvider");
            process_initialize_provider(program_id, accounts, data)
        }
        PoolInstruction::Deposit => {
            msg!("Instruction: Deposit");
            process_deposit(program_id, accounts, data)
        }
        PoolInstruction::Withdraw => {
            msg!("Instruction: Withdraw");
            process_withdraw(program_id, accounts, data)
        }
        PoolInstruction::InitiateDeposit => {
            msg!("Instruction: InitiateDeposit");
            process_initiate_deposit(program_id, accounts, data)
        }
        PoolInstruction::CommitDeposit => {
            msg!("Instruction: CommitDeposit");
            process_commit_deposit(program_id, accounts, data)
        }
        PoolInstruction::InitiateWithdraw => {
            msg!("Instruction: InitiateWithdraw");
            process_initiate_withdraw(program_id, accounts, data)
        }
        PoolInstruction::CommitWithdraw => {
            msg!("Instruction: CommitWithdraw");
            process_commit_withdraw(program_id, accounts, data)
        }
        PoolInstruction::SettleDeposit => {
            msg!("Instruction: SettleDeposit");
            process_settle_deposit(program_id, accounts, data)
        }
        PoolInstruction::SettleWithdraw => {
            msg!("Instruction: SettleWithdraw");
            process_settle_withdraw(program_id, accounts, data)
        }
        PoolInstruction::SetPoolStatus => {
            msg!("Instruction: SetPoolStatus");
            process_set_pool_status(program_id, accounts, data)
        }
        PoolInstruction::Delegate => {
            msg!("Instruction: Delegate");
            process_delegate(program_id, accounts, data)
        }
        PoolInstruction::Undelegate => {
            msg!("Instruction: Undelegate");
            process_undelegate(program_id, accounts, data)
        }
        PoolInstruction::ReconcileDeposit => {
            msg!("Instruction: ReconcileDeposit");
            process_reconcile_deposit(program_id, accounts, data)
        }
        PoolInstruction::ReconcileWithdraw => {
            msg!("Instruction: ReconcileWithdraw");
            process_reconcile_withdraw(program_id, accounts, data)
        }
        PoolInstruction::Commit => {
            msg!("Instruction: Commit");
            process_commit(program_id, accounts, data)
        }
    }
}
